// Device models, registry and transceiver sessions
pub mod model;
pub mod registry;
pub mod transceiver;

// Built-in models
pub mod generic;
pub mod ic706mk2;
pub mod ic7300;

pub use model::{DeviceModel, Filter, OperatingMode};
pub use registry::{list_models, lookup_model, register_model, DeviceRegistry};
pub use transceiver::Transceiver;

/// Every model shipped with the crate
pub fn builtin_models() -> Vec<DeviceModel> {
    vec![generic::model(), ic7300::model(), ic706mk2::model()]
}

/// Initialize and register all built-in device models
///
/// This function must be called once at application startup, before any
/// session is built from configuration.
pub fn init_drivers() {
    for model in builtin_models() {
        register_model(model);
    }
    tracing::info!("Registered {} built-in device models", builtin_models().len());
}
