//-----------------------------------------------------------------------------
// Presenter Factory Tests
//-----------------------------------------------------------------------------

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use pretty_assertions::assert_eq;
use waypoint_component::{ComponentClass, GenericComponent, Presenter};
use waypoint_core::{InvalidLinkMode, RequestHandler, WaypointConfig};
use waypoint_error::{Error, ResolveError};
use waypoint_routing::{
    ClassInfo, ClassRegistry, HandlerContainer, Mask, PresenterFactory, ServiceContainer, ServiceDefinition, INJECT_TAG,
};

fn build(class: &str) -> Box<dyn RequestHandler> {
    let class = ComponentClass::builder(class).build();
    Box::new(Presenter::new(Box::new(GenericComponent::new(class))))
}

fn registry() -> Arc<ClassRegistry> {
    let registry = ClassRegistry::new();
    for class in [
        "AdminModule\\DashboardPresenter",
        "Shop\\Admin\\OrdersPresenter",
        "ArticlePresenter",
        "NetteModule\\MicroPresenter",
    ] {
        registry
            .register(ClassInfo::handler(class, move || build(class)))
            .unwrap();
    }
    registry.register(ClassInfo::abstract_handler("BasePresenter")).unwrap();
    registry.register(ClassInfo::plain("HelperPresenter")).unwrap();
    Arc::new(registry)
}

fn factory() -> PresenterFactory {
    let registry = registry();
    let container = Arc::new(ServiceContainer::new(registry.clone()));
    PresenterFactory::new(registry, container)
}

fn link_mode(handler: &dyn RequestHandler) -> Option<InvalidLinkMode> {
    handler.as_any().downcast_ref::<Presenter>().unwrap().invalid_link_mode()
}

//-----------------------------------------------------------------------------
// Class resolution
//-----------------------------------------------------------------------------

#[test]
fn test_wildcard_mapping() {
    let factory = factory();
    assert_eq!(
        factory.presenter_class("Admin:Dashboard").unwrap(),
        "AdminModule\\DashboardPresenter"
    );
    // cached and idempotent
    assert_eq!(
        factory.presenter_class("Admin:Dashboard").unwrap(),
        "AdminModule\\DashboardPresenter"
    );
    assert_eq!(factory.presenter_class("Nette:Micro").unwrap(), "NetteModule\\MicroPresenter");
}

#[test]
fn test_module_mapping() {
    let factory = factory();
    factory.set_mapping([("Shop", "Shop\\*\\*Presenter")]).unwrap();

    assert_eq!(factory.format_presenter_class("Shop:Admin:Orders").unwrap(), "Shop\\Admin\\OrdersPresenter");
    assert_eq!(factory.presenter_class("Shop:Admin:Orders").unwrap(), "Shop\\Admin\\OrdersPresenter");
    // unregistered module falls back to the wildcard
    assert_eq!(
        factory.format_presenter_class("Store:Admin:Orders").unwrap(),
        "StoreModule\\AdminModule\\OrdersPresenter"
    );
}

#[test]
fn test_module_mapping_from_parts() {
    let factory = factory();
    factory.set_mask("Shop", Mask::new("Shop\\", "*\\", "*Presenter")).unwrap();
    assert_eq!(factory.presenter_class("Shop:Admin:Orders").unwrap(), "Shop\\Admin\\OrdersPresenter");
}

#[test]
fn test_canonical_class_name() {
    let factory = factory();
    assert_eq!(factory.presenter_class("article").unwrap(), "ArticlePresenter");
}

#[test]
fn test_validation_order() {
    let factory = factory();

    for name in ["", "1Article", "Admin-Dashboard", ":Admin"] {
        assert_eq!(
            factory.presenter_class(name).unwrap_err(),
            ResolveError::InvalidName { name: name.to_string() }
        );
    }
    assert_eq!(
        factory.presenter_class("Missing").unwrap_err(),
        ResolveError::HandlerNotFound { name: "Missing".to_string(), class: "MissingPresenter".to_string() }
    );
    assert_eq!(
        factory.presenter_class("Helper").unwrap_err(),
        ResolveError::NotAHandler { name: "Helper".to_string(), class: "HelperPresenter".to_string() }
    );
    assert_eq!(
        factory.presenter_class("base").unwrap_err(),
        ResolveError::AbstractHandler { name: "base".to_string(), class: "BasePresenter".to_string() }
    );
}

#[test]
fn test_invalid_mapping_leaves_table_unchanged() {
    let factory = factory();
    let err = factory
        .set_mapping([("Admin", "App\\*Module\\*Presenter"), ("Bad", "nope")])
        .err()
        .unwrap();
    assert_eq!(err, ResolveError::InvalidMapping { mask: "nope".to_string() });
    assert_eq!(
        factory.format_presenter_class("Admin:Dashboard").unwrap(),
        "AdminModule\\DashboardPresenter"
    );
}

#[test]
fn test_remapping_drops_cached_classes() {
    let factory = factory();
    factory.presenter_class("Admin:Dashboard").unwrap();

    factory.set_mapping([("Admin", "App\\*Module\\*Presenter")]).unwrap();
    assert_eq!(
        factory.presenter_class("Admin:Dashboard").unwrap_err(),
        ResolveError::HandlerNotFound {
            name: "Admin:Dashboard".to_string(),
            class: "App\\DashboardPresenter".to_string()
        }
    );
}

#[test]
fn test_concurrent_resolution() {
    let factory = Arc::new(factory());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let factory = factory.clone();
            thread::spawn(move || factory.presenter_class("Admin:Dashboard").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "AdminModule\\DashboardPresenter");
    }
}

#[test]
fn test_remapping_during_resolution_keeps_cache_current() {
    const OLD: &str = "AdminModule\\DashboardPresenter";
    const NEW: &str = "Backoffice\\DashboardPresenter";

    let registry = registry();
    registry.register(ClassInfo::handler(NEW, || build(NEW))).unwrap();
    let container = Arc::new(ServiceContainer::new(registry.clone()));
    let factory = Arc::new(PresenterFactory::new(registry, container));

    let resolvers: Vec<_> = (0..4)
        .map(|_| {
            let factory = factory.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    let class = factory.presenter_class("Admin:Dashboard").unwrap();
                    assert!(class == OLD || class == NEW, "unexpected class {}", class);
                }
            })
        })
        .collect();

    for round in 0..50 {
        let mask = if round % 2 == 0 { "Backoffice\\*Presenter" } else { "AdminModule\\*Presenter" };
        factory.set_mapping([("Admin", mask)]).unwrap();
    }
    factory.set_mapping([("Admin", "Backoffice\\*Presenter")]).unwrap();

    for resolver in resolvers {
        resolver.join().unwrap();
    }
    assert_eq!(factory.presenter_class("Admin:Dashboard").unwrap(), NEW);
}

//-----------------------------------------------------------------------------
// Presenter creation
//-----------------------------------------------------------------------------

#[test]
fn test_fresh_instance_gets_injections_and_link_mode() {
    let registry = registry();
    let injected = Arc::new(AtomicUsize::new(0));
    let counter = injected.clone();
    let container = ServiceContainer::new(registry.clone()).with_injector(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    let factory = PresenterFactory::new(registry, Arc::new(container));

    let presenter = factory.create_presenter("Admin:Dashboard").unwrap();
    assert_eq!(presenter.class_name(), "AdminModule\\DashboardPresenter");
    assert_eq!(link_mode(presenter.as_ref()), Some(InvalidLinkMode::Silent));
    assert_eq!(injected.load(Ordering::SeqCst), 1);
}

#[test]
fn test_debug_mode_selects_warning() {
    let registry = registry();
    let container = ServiceContainer::new(registry.clone()).with_debug_mode(true);
    assert!(container.debug_mode());
    let factory = PresenterFactory::new(registry, Arc::new(container));

    let presenter = factory.create_presenter("Article").unwrap();
    assert_eq!(link_mode(presenter.as_ref()), Some(InvalidLinkMode::Warning));
}

#[test]
fn test_sole_service_is_preferred() {
    let registry = registry();
    let injected = Arc::new(AtomicUsize::new(0));
    let counter = injected.clone();
    let container = ServiceContainer::new(registry.clone())
        .with_service(
            "orders",
            ServiceDefinition::new("Shop\\Admin\\OrdersPresenter", || {
                let class = ComponentClass::builder("OrdersService").build();
                Box::new(
                    Presenter::new(Box::new(GenericComponent::new(class)))
                        .with_invalid_link_mode(InvalidLinkMode::Exception),
                )
            }),
        )
        .with_service(
            "dashboard",
            ServiceDefinition::new("AdminModule\\DashboardPresenter", || build("DashboardService"))
                .with_tag(INJECT_TAG),
        )
        .with_injector(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    let factory = PresenterFactory::new(registry, Arc::new(container));
    factory.set_mapping([("Shop", "Shop\\*\\*Presenter")]).unwrap();

    let orders = factory.create_presenter("Shop:Admin:Orders").unwrap();
    assert_eq!(orders.class_name(), "OrdersService");
    // an explicit mode survives
    assert_eq!(link_mode(orders.as_ref()), Some(InvalidLinkMode::Exception));
    assert_eq!(injected.load(Ordering::SeqCst), 1);

    // tagged services are not injected again
    let dashboard = factory.create_presenter("Admin:Dashboard").unwrap();
    assert_eq!(dashboard.class_name(), "DashboardService");
    assert_eq!(injected.load(Ordering::SeqCst), 1);
}

#[test]
fn test_ambiguous_services_fall_back_to_instance() {
    let registry = registry();
    let container = ServiceContainer::new(registry.clone())
        .with_service("a", ServiceDefinition::new("ArticlePresenter", || build("ServiceA")))
        .with_service("b", ServiceDefinition::new("ArticlePresenter", || build("ServiceB")));
    let factory = PresenterFactory::new(registry, Arc::new(container));

    let presenter = factory.create_presenter("Article").unwrap();
    assert_eq!(presenter.class_name(), "ArticlePresenter");
}

#[test]
fn test_failed_injection_propagates() {
    let registry = registry();
    let container = ServiceContainer::new(registry.clone())
        .with_injector(|_| Err(Error::internal("missing dependency")));
    let factory = PresenterFactory::new(registry, Arc::new(container));

    let err = factory.create_presenter("Article").err().unwrap();
    assert_eq!(err, Error::internal("missing dependency"));

    let err = factory.create_presenter("Missing").err().unwrap();
    assert!(matches!(err, Error::Resolve(ResolveError::HandlerNotFound { .. })));
}

//-----------------------------------------------------------------------------
// Configuration
//-----------------------------------------------------------------------------

#[test]
fn test_factory_from_config() {
    let config = WaypointConfig::from_toml_str(
        r#"
        [application]
        debug_mode = true
        invalid_link_mode = "exception"

        [mapping]
        Shop = 'Shop\*\*Presenter'
        "#,
    )
    .unwrap();

    let registry = registry();
    let container = Arc::new(ServiceContainer::from_config(&config.application, registry.clone()));
    let factory = PresenterFactory::from_config(&config, registry, container).unwrap();

    let presenter = factory.create_presenter("Shop:Admin:Orders").unwrap();
    assert_eq!(presenter.class_name(), "Shop\\Admin\\OrdersPresenter");
    assert_eq!(link_mode(presenter.as_ref()), Some(InvalidLinkMode::Exception));
}

#[test]
fn test_config_with_bad_mask_fails() {
    let config = WaypointConfig::from_toml_str(
        r#"
        [mapping]
        Shop = 'Shop-Presenter'
        "#,
    )
    .unwrap();

    let registry = registry();
    let container = Arc::new(ServiceContainer::new(registry.clone()));
    let err = PresenterFactory::from_config(&config, registry, container).err().unwrap();
    assert_eq!(err, ResolveError::InvalidMapping { mask: "Shop-Presenter".to_string() });
}
