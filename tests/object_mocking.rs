//! End-to-end behavior of object mocks: creation, recording, verification
//! and stubbing.

use std::sync::{Arc, Once};

use parking_lot::Mutex;
use testkit_mock::prelude::*;

fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn my_object() -> Template {
    Template::builder("MyObject")
        .method_with("greeting", |_, _| Value::from("hello"))
        .method_with("farewell", |_, _| Value::from("goodbye"))
        .build()
}

fn expect_failure(result: Result<()>) -> String {
    result.expect_err("verification should have failed").to_string()
}

mod when_mock_object_created {
    use super::*;

    #[test]
    fn is_an_instance_of_the_same_class() {
        let template = my_object();
        let m = mock(&template);
        assert_that!(Value::from(&m), instance_of(&template));
    }
}

mod when_mock_method_invoked_once_with_no_arguments {
    use super::*;

    fn setup() -> (Mock, Value) {
        init_tracing();
        let m = mock(&my_object());
        let result = m.invoke("greeting", args![]).unwrap();
        (m, result)
    }

    #[test]
    fn returns_undefined() {
        let (_, result) = setup();
        assert_that!(result, same_as(Value::Undefined));
    }

    #[test]
    fn verifies_method_was_invoked() {
        let (m, _) = setup();
        verify(&m).method("greeting").with(matchers![]).unwrap();
    }

    #[test]
    fn verifies_method_was_invoked_with_scope() {
        let (m, _) = setup();
        verify(&m).method("greeting").call(&m, matchers![]).unwrap();
    }

    #[test]
    fn verifies_method_was_invoked_using_scope_matcher() {
        let (m, _) = setup();
        verify(&m).method("greeting").apply(anything(), &[]).unwrap();
    }

    #[test]
    fn does_not_verify_with_different_scope() {
        let (m, _) = setup();
        let test_scope = Value::empty_object();
        let message = expect_failure(verify(&m).method("greeting").call(&test_scope, matchers![]));
        assert_eq!(
            message,
            format!("Wanted but not invoked: obj.greeting(), 'this' being equal to {test_scope}")
        );
        assert_eq!(
            message,
            "Wanted but not invoked: obj.greeting(), 'this' being equal to [object Object]"
        );
    }

    #[test]
    fn does_not_verify_method_was_invoked_twice() {
        let (m, _) = setup();
        let message = expect_failure(verify_with(&m, times(2)).method("greeting").with(matchers![]));
        assert_eq!(message, "Wanted but not invoked: obj.greeting()");
    }
}

mod when_mock_method_invoked_with_multiple_arguments {
    use super::*;

    fn setup() -> Mock {
        let m = mock(&my_object());
        m.invoke("farewell", args!["hunter", "thompson", 67]).unwrap();
        m
    }

    #[test]
    fn verifies_the_method_was_invoked() {
        let m = setup();
        verify(&m).method("farewell").with(matchers![]).unwrap();
    }

    #[test]
    fn verifies_with_some_arguments() {
        let m = setup();
        verify(&m)
            .method("farewell")
            .with(matchers!["hunter", "thompson"])
            .unwrap();
    }

    #[test]
    fn verifies_with_all_arguments() {
        let m = setup();
        verify(&m)
            .method("farewell")
            .with(matchers!["hunter", "thompson", 67])
            .unwrap();
    }

    #[test]
    fn verifies_using_matchers() {
        let m = setup();
        verify(&m)
            .method("farewell")
            .with(matchers!["hunter", "thompson", less_than(100)])
            .unwrap();
    }

    #[test]
    fn does_not_verify_when_looking_for_additional_arguments() {
        let m = setup();
        let message = expect_failure(
            verify(&m)
                .method("farewell")
                .with(matchers!["hunter", "thompson", 67, "batcountry"]),
        );
        assert_eq!(
            message,
            "Wanted but not invoked: obj.farewell(<equal to \"hunter\">, <equal to \"thompson\">, <equal to 67>, <equal to \"batcountry\">)"
        );
    }

    #[test]
    fn does_not_verify_with_different_arguments() {
        let m = setup();
        let message = expect_failure(
            verify(&m)
                .method("farewell")
                .with(matchers!["hunter", "thompson", 68]),
        );
        assert_eq!(
            message,
            "Wanted but not invoked: obj.farewell(<equal to \"hunter\">, <equal to \"thompson\">, <equal to 68>)"
        );
    }

    #[test]
    fn describes_other_matchers() {
        let m = setup();
        let message = expect_failure(
            verify(&m)
                .method("farewell")
                .with(matchers!["hunter", anything(), less_than(50)]),
        );
        assert_eq!(
            message,
            "Wanted but not invoked: obj.farewell(<equal to \"hunter\">, <anything>, <less than 50>)"
        );
    }
}

mod when_mock_method_invoked_with_different_scope {
    use super::*;

    fn setup() -> (Mock, Value) {
        let m = mock(&my_object());
        let test_scope = Value::empty_object();
        m.method("greeting")
            .unwrap()
            .call(test_scope.clone(), args![]);
        (m, test_scope)
    }

    #[test]
    fn does_not_verify_without_explicit_scope() {
        let (m, _) = setup();
        let message = expect_failure(verify(&m).method("greeting").with(matchers![]));
        assert_eq!(message, "Wanted but not invoked: obj.greeting()");
    }

    #[test]
    fn verifies_with_explicit_scope() {
        let (m, test_scope) = setup();
        verify(&m).method("greeting").apply(test_scope, &[]).unwrap();
    }

    #[test]
    fn verifies_with_identity_scope() {
        let (m, test_scope) = setup();
        verify(&m)
            .method("greeting")
            .apply(same_as(test_scope), &[])
            .unwrap();
        assert!(verify(&m)
            .method("greeting")
            .apply(same_as(Value::empty_object()), &[])
            .is_err());
    }
}

mod when_stubbing_methods {
    use super::*;

    /// Captures what the stub function saw, like a spy.
    #[derive(Clone, Default)]
    struct StubProbe {
        scope: Arc<Mutex<Option<Value>>>,
        arguments: Arc<Mutex<Option<Vec<Value>>>>,
    }

    impl StubProbe {
        fn function(&self) -> impl Fn(&Value, &[Value]) -> Value + Send + Sync + 'static {
            let probe = self.clone();
            move |this: &Value, args: &[Value]| {
                *probe.scope.lock() = Some(this.clone());
                *probe.arguments.lock() = Some(args.to_vec());
                Value::from("stub result")
            }
        }

        fn scope(&self) -> Option<Value> {
            self.scope.lock().clone()
        }

        fn arguments(&self) -> Option<Vec<Value>> {
            self.arguments.lock().clone()
        }
    }

    mod with_no_arguments {
        use super::*;

        #[test]
        fn returns_undefined_without_then_clause() {
            let m = mock(&my_object());
            when(&m).method("greeting").with(matchers![]).unwrap();
            assert_that!(m.invoke("greeting", args![]).unwrap(), same_as(Value::Undefined));
        }

        fn setup() -> (Mock, StubProbe) {
            let m = mock(&my_object());
            let probe = StubProbe::default();
            when(&m)
                .method("greeting")
                .with(matchers![])
                .unwrap()
                .then(probe.function());
            (m, probe)
        }

        #[test]
        fn returns_result_of_stub_function() {
            let (m, _) = setup();
            assert_that!(m.invoke("greeting", args![]).unwrap(), "stub result");
        }

        #[test]
        fn invokes_stub_function_when_called() {
            let (m, probe) = setup();
            m.invoke("greeting", args![]).unwrap();
            assert!(probe.arguments().is_some());
        }

        #[test]
        fn uses_the_mock_as_scope_by_default() {
            let (m, probe) = setup();
            m.invoke("greeting", args![]).unwrap();
            assert_that!(probe.scope().unwrap(), same_as(&m), "Scope was not the same");
        }

        #[test]
        fn passes_the_same_arguments() {
            let (m, probe) = setup();
            m.invoke("greeting", args!["hello", Value::Undefined, 5])
                .unwrap();
            assert_that!(
                Value::from(probe.arguments().unwrap()),
                equal_to(args!["hello", Value::Undefined, 5])
            );
        }

        #[test]
        fn invokes_via_call_with_object_as_scope() {
            let (m, probe) = setup();
            m.method("greeting").unwrap().call(&m, args![]);
            assert_that!(probe.scope().unwrap(), same_as(&m), "Scope was not the same");
        }

        #[test]
        fn invokes_via_apply_with_object_as_scope() {
            let (m, probe) = setup();
            m.method("greeting")
                .unwrap()
                .apply(&m, &args!["hello", 6]);
            assert_that!(probe.scope().unwrap(), same_as(&m), "Scope was not the same");
            assert_eq!(probe.arguments().unwrap(), args!["hello", 6]);
        }

        #[test]
        fn does_not_invoke_via_call_with_different_scope() {
            let (m, probe) = setup();
            let result = m
                .method("greeting")
                .unwrap()
                .call(Value::empty_object(), args![]);
            assert_that!(result, same_as(Value::Undefined));
            assert!(probe.scope().is_none());
        }
    }

    mod with_multiple_arguments {
        use super::*;

        fn setup() -> Mock {
            let m = mock(&my_object());
            let probe = StubProbe::default();
            when(&m)
                .method("farewell")
                .with(matchers!["foo", less_than(10), anything()])
                .unwrap()
                .then(probe.function());
            m
        }

        #[test]
        fn returns_result_of_stub_function() {
            let m = setup();
            assert_that!(
                m.invoke("farewell", args!["foo", 9, Value::empty_object()])
                    .unwrap(),
                equal_to("stub result")
            );
        }

        #[test]
        fn invokes_stub_even_if_additional_arguments_are_present() {
            let m = setup();
            let result = m.method("farewell").unwrap().apply(
                &m,
                &args!["foo", 9, Value::empty_object(), "something else"],
            );
            assert_that!(result, equal_to("stub result"));
        }

        #[test]
        fn returns_undefined_if_insufficient_arguments() {
            let m = setup();
            assert_that!(
                m.invoke("farewell", args!["foo", 9]).unwrap(),
                same_as(Value::Undefined)
            );
        }

        #[test]
        fn returns_undefined_if_arguments_do_not_match() {
            let m = setup();
            assert_that!(
                m.invoke("farewell", args!["foo", 11, "bar"]).unwrap(),
                same_as(Value::Undefined)
            );
        }
    }

    mod with_explicit_scope_matcher {
        use super::*;

        #[test]
        fn invokes_stub_function_with_the_same_explicit_scope() {
            let m = mock(&my_object());
            let probe = StubProbe::default();
            when(&m)
                .method("greeting")
                .call(anything(), matchers![])
                .unwrap()
                .then(probe.function());

            let scope = Value::empty_object();
            m.method("greeting")
                .unwrap()
                .call(scope.clone(), args![1, "foo"]);
            assert_that!(probe.scope().unwrap(), same_as(scope), "Scope was not the same");
        }
    }
}

mod interactions {
    use super::*;

    #[test]
    fn every_call_is_recorded_in_order() {
        let m = mock(&my_object());
        m.invoke("greeting", args![]).unwrap();
        m.invoke("farewell", args!["hunter"]).unwrap();
        m.invoke("greeting", args![1]).unwrap();

        let calls = m.all_invocations();
        let methods: Vec<_> = calls.iter().map(|c| c.method()).collect();
        assert_eq!(methods, vec!["greeting", "farewell", "greeting"]);
        assert!(calls.windows(2).all(|w| w[0].sequence() < w[1].sequence()));
    }

    #[test]
    fn mocked_methods_do_not_run_original_bodies() {
        let template = my_object();
        let m = mock(&template);
        assert_eq!(
            template.call_original("greeting", &Value::from(&m), &[]).unwrap(),
            Value::from("hello")
        );
        assert!(m.invoke("greeting", args![]).unwrap().is_undefined());
    }

    #[test]
    fn zero_and_no_more_interactions() {
        let m = mock(&my_object());
        verify_zero_interactions(&m).unwrap();

        m.invoke("greeting", args![]).unwrap();
        assert!(verify_zero_interactions(&m).is_err());
        assert!(verify_no_more_interactions(&m).is_err());

        verify(&m).method("greeting").with(matchers![]).unwrap();
        verify_no_more_interactions(&m).unwrap();
    }

    #[test]
    fn mocks_can_be_passed_as_arguments() {
        let m = mock(&my_object());
        let collaborator = mock(&my_object());
        m.invoke("farewell", args![&collaborator]).unwrap();

        verify(&m)
            .method("farewell")
            .with(matchers![same_as(&collaborator)])
            .unwrap();
        assert!(verify(&m)
            .method("farewell")
            .with(matchers![same_as(&m)])
            .is_err());
    }

    #[test]
    fn json_values_as_arguments() {
        let m = mock(&my_object());
        m.invoke(
            "farewell",
            args![serde_json::json!({"name": "hunter", "age": 67})],
        )
        .unwrap();

        verify(&m)
            .method("farewell")
            .with(matchers![Value::object([
                ("age", Value::from(67)),
                ("name", Value::from("hunter")),
            ])])
            .unwrap();
    }
}
