pub mod indicators;
pub mod utilities;

pub mod bindings {
    #[cfg(feature = "python")]
    pub mod python;
}
