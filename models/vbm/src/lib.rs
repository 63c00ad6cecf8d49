pub mod context;
#[cfg(feature = "export")]
pub mod convert;
pub mod object;
#[cfg(feature = "gl")]
pub mod opengl;
pub mod vbm;
