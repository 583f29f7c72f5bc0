pub mod background;
pub mod beam;
pub mod config;
pub mod consts;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod radial;
pub mod stack;
pub mod transform;
pub mod vacuum;
