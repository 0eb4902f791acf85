mod make_polygon;
mod make_rectangle;

pub use make_polygon::MakePolygon;
pub use make_rectangle::MakeRectangle;
