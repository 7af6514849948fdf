pub mod analyze;
pub mod intel;
