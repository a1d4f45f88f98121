pub mod bounds;
pub mod constrain;
pub mod decimal;
pub mod error;
pub mod interpolate;
pub mod points;
pub mod transform;

pub use bounds::{Bound, ScaleExtent, TranslateExtent};
pub use constrain::{constrain, Extent};
pub use decimal::{Decimal, WORKING_PRECISION};
pub use error::DecimalError;
pub use interpolate::{interpolate_zoom, TransformTween, ViewPath, ZoomInterpolator, ZoomView};
pub use points::{Point, Rect};
pub use transform::Transform;
