//! End-to-end tests through `#[derive(Injectable)]` and the global catalog.

use std::sync::Arc;

use sanad::prelude::*;
use sanad::{Injectable, downcast};

// === Types ===

#[derive(Injectable)]
struct Foo;

#[derive(Injectable)]
struct Foo2;

trait Describe {
    fn method(&self) -> &'static str;
}

impl Describe for Foo {
    fn method(&self) -> &'static str {
        "Foo"
    }
}

impl Describe for Foo2 {
    fn method(&self) -> &'static str {
        "Foo2"
    }
}

#[derive(Injectable)]
struct Bar {
    foo: Arc<Foo>,
    #[inject(default = "None")]
    qux: Option<String>,
}

#[derive(Injectable)]
struct Baz;

#[derive(Injectable)]
#[inject(provider)]
struct BazProvider;

impl Provider for BazProvider {
    fn provide(_key: &DependencyKey, _container: &Container) -> Result<Instance> {
        Ok(Arc::new(Baz))
    }
}

#[derive(Injectable)]
#[inject(provider)]
struct Qux {
    val: i32,
}

impl Provider for Qux {
    fn provide(_key: &DependencyKey, _container: &Container) -> Result<Instance> {
        Ok(Arc::new(Qux { val: 42 }))
    }
}

#[derive(Injectable)]
#[inject(with = "call_methods")]
struct Call;

fn call_methods(info: TypeInfo) -> TypeInfo {
    info.static_method("f1", vec![Parameter::of::<Foo>("foo")], |args| foo_method(&args))
        .method("f2", vec![Parameter::of::<Foo>("foo")], |_: &Call, args| {
            foo_method(&args)
        })
}

#[derive(Injectable)]
#[inject(transient)]
struct Ticket;

#[derive(Injectable)]
#[inject(name = "Mailer")]
struct SmtpMailer {
    #[inject(default = "String::from(\"localhost\")")]
    host: String,
}

#[derive(Injectable)]
struct Greeter {
    #[inject(key = "FooInterface")]
    foo: Arc<Foo>,
}

#[derive(Injectable)]
struct Plugin {
    #[inject(key = "Baz")]
    inner: Instance,
}

/// Calls `method()` on whichever Foo flavour the argument holds.
fn foo_method(args: &Args) -> Result<&'static str> {
    let foo = args.instance("foo")?;
    if let Some(foo) = foo.downcast_ref::<Foo>() {
        return Ok(foo.method());
    }
    Ok(args.arc::<Foo2>("foo")?.method())
}

fn foo_closure() -> Callable {
    Callable::function(vec![Parameter::of::<Foo>("foo")], |args| foo_method(&args))
}

fn call_str(container: &Container, callable: &Callable, values: &Values) -> &'static str {
    *container.call_as::<&'static str>(callable, values, None).unwrap()
}

// === Global container ===

#[test]
fn should_return_singleton_container_instance() {
    let first = sanad::container();
    let second = sanad::container();
    assert!(Arc::ptr_eq(&first, &second));
}

// === Reflection ===

#[test]
fn should_resolve_class_using_derived_metadata() {
    let container = Container::new();
    assert!(container.get("Foo").unwrap().downcast_ref::<Foo>().is_some());
    assert!(container.make::<Foo>().is_ok());
}

#[test]
fn should_resolve_class_with_dependencies() {
    let container = Container::new();
    let bar: Arc<Bar> = container.get_as("Bar").unwrap();
    assert_eq!(bar.foo.method(), "Foo");
    assert!(bar.qux.is_none());
}

#[test]
fn derived_types_are_invisible_without_discovery() {
    let container = Container::builder().discover_types(false).build();
    assert!(matches!(container.get("Foo"), Err(SanadError::UnknownType(_))));

    container.register::<Foo>();
    assert!(container.get("Foo").is_ok());
}

#[test]
fn unknown_type_suggests_derived_names() {
    let container = Container::new();
    match container.get("Barr").unwrap_err() {
        SanadError::UnknownType(err) => {
            assert!(err.suggestions.contains(&"Bar".to_string()));
            assert!(err.to_string().contains("Barr"));
        }
        other => panic!("Expected UnknownType, got: {other:?}"),
    }
}

// === Bindings ===

#[test]
fn should_bind_interface_to_concrete_class() {
    let container = Container::new();
    container.bind("FooInterface", "Foo");
    assert!(container.get("FooInterface").unwrap().downcast_ref::<Foo>().is_some());
}

#[test]
fn should_alias_class_binding() {
    let container = Container::new();
    container.bind("Foo", "Foo2");
    assert!(container.get("Foo").unwrap().downcast_ref::<Foo2>().is_some());
}

#[test]
fn should_resolve_multi_binding_to_most_concrete_class() {
    let container = Container::new();
    container.bind("FooInterface", "Foo");
    container.bind("Foo", "Foo2");
    assert!(container.get("FooInterface").unwrap().downcast_ref::<Foo2>().is_some());
}

#[test]
fn field_key_goes_through_bindings() {
    let container = Container::new();
    container.bind("FooInterface", "Foo");

    let greeter = container.make::<Greeter>().unwrap();
    let foo = container.make::<Foo>().unwrap();
    assert!(Arc::ptr_eq(&greeter.foo, &foo));
}

#[test]
fn shared_field_bound_to_other_type_is_a_mismatch() {
    let container = Container::new();
    container.bind("Foo", "Foo2");
    assert!(matches!(container.get("Bar"), Err(SanadError::TypeMismatch(_))));
}

// === Caching ===

#[test]
fn should_return_same_instance_for_shared_service() {
    let container = Container::new();
    let a = container.get("Foo").unwrap();
    let b = container.get("Foo").unwrap();
    assert!(Arc::ptr_eq(&a, &b));
}

#[test]
fn should_return_different_instances_for_transient_service() {
    let container = Container::new();
    container.transient("Foo");
    let a = container.get("Foo").unwrap();
    let b = container.get("Foo").unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

#[test]
fn derived_transient_type_is_never_cached() {
    let container = Container::new();
    let a = container.make::<Ticket>().unwrap();
    let b = container.make::<Ticket>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
}

// === Explicit values ===

#[test]
fn resolve_injects_provided_values() {
    let container = Container::new();
    let values = Values::new().with("qux", Some("quxx".to_string()));
    let bar: Arc<Bar> = downcast(container.resolve("Bar", &values).unwrap(), "Bar").unwrap();
    assert_eq!(bar.qux.as_deref(), Some("quxx"));
}

#[test]
fn resolve_returns_new_instance_each_time() {
    let container = Container::new();
    let first = container
        .resolve("Bar", &Values::new().with("qux", Some("quxx".to_string())))
        .unwrap();
    let second = container
        .resolve("Bar", &Values::new().with("qux", Some("quxy".to_string())))
        .unwrap();
    assert!(!Arc::ptr_eq(&first, &second));

    let first: Arc<Bar> = downcast(first, "Bar").unwrap();
    let second: Arc<Bar> = downcast(second, "Bar").unwrap();
    assert_eq!(first.qux.as_deref(), Some("quxx"));
    assert_eq!(second.qux.as_deref(), Some("quxy"));
}

#[test]
fn named_type_with_default_field() {
    let container = Container::new();
    let mailer: Arc<SmtpMailer> = container.get_as("Mailer").unwrap();
    assert_eq!(mailer.host, "localhost");

    let custom = container
        .resolve("Mailer", &Values::new().with("host", "smtp.example.com".to_string()))
        .unwrap();
    let custom: Arc<SmtpMailer> = downcast(custom, "Mailer").unwrap();
    assert_eq!(custom.host, "smtp.example.com");
}

#[test]
fn instance_field_receives_raw_instance() {
    let container = Container::new();
    let plugin = container.make::<Plugin>().unwrap();
    assert!(plugin.inner.downcast_ref::<Baz>().is_some());
}

// === Providers ===

#[test]
fn should_resolve_service_using_provider() {
    let container = Container::new();
    container.provider("Quux", "BazProvider");
    assert!(container.get("Quux").unwrap().downcast_ref::<Baz>().is_some());
}

#[test]
fn should_resolve_class_using_its_own_provider() {
    let container = Container::new();
    let qux: Arc<Qux> = container.get_as("Qux").unwrap();
    assert_eq!(qux.val, 42);
}

#[test]
fn container_provider_overrides_own_provider() {
    let container = Container::new();
    container.provider("Qux", "BazProvider");
    assert!(container.get("Qux").unwrap().downcast_ref::<Baz>().is_some());
}

#[test]
fn explicit_policy_skips_own_provider() {
    let container = Container::builder()
        .provider_policy(ProviderPolicy::Explicit)
        .build();
    let qux = container.resolve("Qux", &Values::new().with("val", 7i32)).unwrap();
    let qux: Arc<Qux> = downcast(qux, "Qux").unwrap();
    assert_eq!(qux.val, 7);
}

// === Callables ===

#[test]
fn call_with_closure() {
    let container = Container::new();
    assert_eq!(call_str(&container, &foo_closure(), &Values::new()), "Foo");
}

#[test]
fn call_with_static_class_method() {
    let container = Container::new();
    assert_eq!(call_str(&container, &Callable::from("Call::f1"), &Values::new()), "Foo");
}

#[test]
fn call_with_object_method() {
    let container = Container::new();
    let callable = Callable::method(Arc::new(Call), "f2");
    assert_eq!(call_str(&container, &callable, &Values::new()), "Foo");
}

#[test]
fn call_with_custom_values() {
    let container = Container::new();
    let values = Values::new().with("foo", Foo2);

    assert_eq!(call_str(&container, &foo_closure(), &values), "Foo2");
    assert_eq!(call_str(&container, &Callable::static_method("Call", "f1"), &values), "Foo2");
    assert_eq!(
        call_str(&container, &Callable::method(Arc::new(Call), "f2"), &values),
        "Foo2"
    );
}

#[test]
fn call_args_with_custom_resolver_returns_resolved_value() {
    let container = Container::new();
    let resolver = |declared: Option<&DependencyKey>, _name: &str| -> Option<Instance> {
        (declared == Some(&Foo::key())).then(|| Arc::new(Foo2) as Instance)
    };

    let args = container
        .call_args(&foo_closure(), &Values::new(), Some(&resolver))
        .unwrap();
    assert_eq!(args.arc::<Foo2>("foo").unwrap().method(), "Foo2");
}

#[test]
fn call_args_with_custom_resolver_falls_back_to_container() {
    let container = Container::new();
    let resolver = |_: Option<&DependencyKey>, _: &str| -> Option<Instance> { None };

    let args = container
        .call_args(&foo_closure(), &Values::new(), Some(&resolver))
        .unwrap();
    assert_eq!(args.arc::<Foo>("foo").unwrap().method(), "Foo");
}

#[test]
fn call_args_with_custom_resolver_overrides_custom_values() {
    let container = Container::new();
    let resolver = |declared: Option<&DependencyKey>, _name: &str| -> Option<Instance> {
        (declared == Some(&Foo::key())).then(|| Arc::new(Foo2) as Instance)
    };
    let values = Values::new().with("foo", Foo);

    let args = container
        .call_args(&foo_closure(), &values, Some(&resolver))
        .unwrap();
    assert_eq!(args.arc::<Foo2>("foo").unwrap().method(), "Foo2");
}

// === Validation ===

#[test]
fn validate_derived_graph() {
    let container = Container::new();
    assert!(container.validate("Bar").is_ok());
    assert!(container.validate("Greeter").is_err());

    container.bind("FooInterface", "Foo");
    assert!(container.validate("Greeter").is_ok());
}
