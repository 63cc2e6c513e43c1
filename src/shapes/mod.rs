pub mod circle;
pub mod polygon;
pub mod rectangle;

pub use circle::Circle;
pub use polygon::Polygon;
pub use rectangle::Rectangle;

/// The geometric shape of a rigid body. Dispatch over shape pairs is an
/// exhaustive match on this enum.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Rectangle),
    Polygon(Polygon),
}

impl Shape {
    /// Short tag used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Circle(_) => "circle",
            Shape::Rectangle(_) => "rectangle",
            Shape::Polygon(_) => "polygon",
        }
    }
}
