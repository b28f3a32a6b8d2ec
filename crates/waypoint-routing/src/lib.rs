// Waypoint routing
// Presenter name resolution: class name masks, the class registry, the
// handler container and the presenter factory tying them together

pub mod container;
pub mod factory;
pub mod mapping;
pub mod registry;

pub use container::{HandlerContainer, Injector, ServiceContainer, ServiceDefinition, INJECT_TAG};
pub use factory::{is_valid_presenter_name, PresenterFactory};
pub use mapping::{Mapping, Mask, DEFAULT_INFIX, FRAMEWORK_MODULE, MODULE_SEPARATOR, WILDCARD_MODULE};
pub use registry::{ClassInfo, ClassRegistry, HandlerConstructor};
