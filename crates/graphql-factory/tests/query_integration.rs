//! Integration tests for query execution against compiled schemas.
//!
//! These tests build small schemas with the factory, compile them and run
//! queries through the engine, checking completion and dispatch behaviour.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_graphql::{PathSegment, Request, Variables};
use graphql_factory::{
    CompiledSchema, FieldResult, ID, INT, STRING, SchemaConfig, SchemaDescription, TypeFactory,
    arg, default_arg, list, non_null,
};
use serde_json::{Value, json};

// =============================================================================
// Fixtures
// =============================================================================

graphql_factory::model! {
    #[derive(Debug, Clone)]
    pub struct Being {
        pub kind: String,
        pub name: String,
        pub friends: Vec<String>,
    }
}

graphql_factory::model! {
    #[derive(Debug, Clone)]
    pub struct Report {
        pub title: String,
    }
}

graphql_factory::model! {
    #[derive(Debug, Clone)]
    pub struct Node {
        pub id: String,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeCode(i32);

graphql_factory::enum_value!(EpisodeCode);

fn being(kind: &str, name: &str) -> Being {
    Being {
        kind: kind.to_string(),
        name: name.to_string(),
        friends: Vec::new(),
    }
}

async fn run<C: Send + Sync + 'static>(
    schema: &CompiledSchema<C>,
    query: &str,
    ctx: C,
) -> (Value, Vec<String>) {
    let response = schema.execute(query, ctx).await;
    let errors = response.errors.iter().map(|e| e.message.clone()).collect();
    (response.data.into_json().unwrap(), errors)
}

// =============================================================================
// Dispatch
// =============================================================================

/// Two implementers whose predicates both accept every value.
fn overlapping_schema(human_first: bool) -> CompiledSchema<()> {
    let mut t = TypeFactory::<()>::new();
    let character = t.interface_type::<Being>("Character").fields(|_, f| {
        f.field("name", non_null(STRING));
    });

    let define = |t: &mut TypeFactory<()>, name: &str| {
        t.object_type::<Being>(name)
            .implements(character)
            .is_type_of(|_| true)
            .fields(|_, f| {
                f.default_field("name", non_null(STRING));
            });
    };
    if human_first {
        define(&mut t, "Human");
        define(&mut t, "Droid");
    } else {
        define(&mut t, "Droid");
        define(&mut t, "Human");
    }

    let query = t.query_type().fields(move |_, f| {
        f.field("hero", character, |_, _, _| Ok(being("human", "Luke Skywalker")));
    });
    t.compile(SchemaDescription::new(query)).unwrap()
}

#[tokio::test]
async fn test_dispatch_follows_registration_order() {
    let (data, errors) = run(&overlapping_schema(true), "{ hero { __typename name } }", ()).await;
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(data, json!({ "hero": { "__typename": "Human", "name": "Luke Skywalker" } }));

    let (data, _) = run(&overlapping_schema(false), "{ hero { __typename } }", ()).await;
    assert_eq!(data, json!({ "hero": { "__typename": "Droid" } }));
}

fn character_schema() -> CompiledSchema<()> {
    let mut t = TypeFactory::<()>::new();
    let character = t.interface_type::<Being>("Character").fields(|_, f| {
        f.field("name", non_null(STRING));
    });
    let human = t
        .object_type::<Being>("Human")
        .implements(character)
        .is_type_of(|b| b.kind == "human")
        .fields(|_, f| {
            f.default_field("name", non_null(STRING));
            f.field("rank", non_null(STRING), |b, _, _| -> FieldResult<String> {
                if b.name == "Han Solo" {
                    Err("rank is classified".into())
                } else {
                    Ok("General".to_string())
                }
            });
        });
    let droid = t
        .object_type::<Being>("Droid")
        .implements(character)
        .is_type_of(|b| b.kind == "droid")
        .fields(|_, f| {
            f.default_field("name", non_null(STRING));
            f.field("serial", STRING, |b, _, _| Ok(format!("{}-001", b.name)));
        });
    let search = t.union_type::<Being>("SearchResult").member(droid).member(human).build();

    let query = t.query_type().fields(move |_, f| {
        f.field("characters", non_null(list(character)), |_, _, _| {
            Ok(vec![being("human", "Leia Organa"), being("droid", "R2-D2")])
        });
        f.field("stranger", character, |_, _, _| Ok(being("wookiee", "Chewbacca")));
        f.field("search", non_null(list(non_null(search))), |_, _, _| {
            Ok(vec![being("droid", "C-3PO"), being("human", "Han Solo")])
        });
        f.field("friends", list(character), |_, _, _| {
            Ok(vec![
                being("human", "Luke Skywalker"),
                being("wookiee", "Chewbacca"),
                being("droid", "R2-D2"),
            ])
        });
        f.field("crew", non_null(list(human)), |_, _, _| {
            Ok(vec![being("human", "Leia Organa"), being("human", "Han Solo")])
        });
        f.field("droids", list(droid), |_, _, _| {
            Ok(vec![Some(being("droid", "R2-D2")), None])
        });
    });
    t.compile(SchemaDescription::new(query)).unwrap()
}

#[tokio::test]
async fn test_interface_dispatch_and_unmatched_value() {
    let (data, errors) = run(
        &character_schema(),
        "{ characters { __typename name } stranger { name } }",
        (),
    )
    .await;

    assert_eq!(
        data,
        json!({
            "characters": [
                { "__typename": "Human", "name": "Leia Organa" },
                { "__typename": "Droid", "name": "R2-D2" },
            ],
            "stranger": null,
        })
    );
    assert_eq!(errors, ["could not resolve abstract type for value"]);
}

#[tokio::test]
async fn test_unmatched_list_item_is_nulled_alone() {
    let response = character_schema()
        .execute("{ friends { __typename name } }", ())
        .await;

    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "friends": [
            { "__typename": "Human", "name": "Luke Skywalker" },
            null,
            { "__typename": "Droid", "name": "R2-D2" },
        ] })
    );
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].message,
        "could not resolve abstract type for value"
    );
    assert_eq!(
        response.errors[0].path,
        [PathSegment::Field("friends".into()), PathSegment::Index(1)]
    );
}

#[tokio::test]
async fn test_failing_non_null_field_nulls_list_item() {
    let response = character_schema().execute("{ crew { name rank } }", ()).await;

    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "crew": [{ "name": "Leia Organa", "rank": "General" }, null] })
    );
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "rank is classified");
    assert_eq!(
        response.errors[0].path,
        [
            PathSegment::Field("crew".into()),
            PathSegment::Index(1),
            PathSegment::Field("rank".into()),
        ]
    );
}

#[tokio::test]
async fn test_null_object_items() {
    let (data, errors) = run(&character_schema(), "{ droids { __typename name } }", ()).await;
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        data,
        json!({ "droids": [{ "__typename": "Droid", "name": "R2-D2" }, null] })
    );
}

#[tokio::test]
async fn test_union_members_dispatch() {
    let query = r#"{
        search {
            __typename
            ... on Droid { name serial }
            ... on Human { name }
        }
    }"#;
    let (data, errors) = run(&character_schema(), query, ()).await;

    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        data,
        json!({ "search": [
            { "__typename": "Droid", "name": "C-3PO", "serial": "C-3PO-001" },
            { "__typename": "Human", "name": "Han Solo" },
        ] })
    );
}

// =============================================================================
// Completion
// =============================================================================

fn report_schema() -> CompiledSchema<()> {
    let mut t = TypeFactory::<()>::new();
    let report = t.object_type::<Report>("Report").fields(|_, f| {
        f.default_field("title", non_null(STRING));
        f.field("numbers", non_null(list(non_null(INT))), |_, _, _| {
            Ok(vec![Some(1), None, Some(3)])
        });
        f.field("scores", list(INT), |_, _, _| Ok(vec![Some(7), None]));
    });
    let query = t.query_type().fields(move |_, f| {
        f.field("report", report, |_, _, _| {
            Ok(Report {
                title: "Census".into(),
            })
        });
        f.field("status", non_null(STRING), |_, _, _| Ok("ok"));
        f.field("missing", non_null(STRING), |_, _, _| Ok(None::<String>));
    });
    t.compile(SchemaDescription::new(query)).unwrap()
}

#[tokio::test]
async fn test_null_item_in_non_null_list_keeps_siblings() {
    let (data, errors) = run(
        &report_schema(),
        "{ report { title numbers } status }",
        (),
    )
    .await;

    assert_eq!(data, json!({ "report": null, "status": "ok" }));
    assert_eq!(
        errors,
        ["Cannot return null for non-nullable field Report.numbers."]
    );
}

#[tokio::test]
async fn test_non_null_failure_reports_item_path() {
    let response = report_schema()
        .execute("{ report { numbers } }", ())
        .await;
    assert_eq!(response.data.into_json().unwrap(), json!({ "report": null }));
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].path,
        [
            PathSegment::Field("report".into()),
            PathSegment::Field("numbers".into()),
            PathSegment::Index(1),
        ]
    );
}

#[tokio::test]
async fn test_nullable_list_items() {
    let (data, errors) = run(&report_schema(), "{ report { title scores } }", ()).await;
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(
        data,
        json!({ "report": { "title": "Census", "scores": [7, null] } })
    );
}

#[tokio::test]
async fn test_null_root_field_nulls_data() {
    let schema = report_schema();
    let response = schema.execute("{ status missing }", ()).await;
    assert_eq!(response.data.into_json().unwrap(), Value::Null);
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].message,
        "Cannot return null for non-nullable field Query.missing."
    );
}

// =============================================================================
// Enums
// =============================================================================

fn episode_schema() -> CompiledSchema<()> {
    let mut t = TypeFactory::<()>::new();
    let episode = t
        .enum_type::<EpisodeCode>("Episode")
        .description("One of the films in the Star Wars Trilogy")
        .value("NEWHOPE", EpisodeCode(4))
        .value("EMPIRE", EpisodeCode(5))
        .value("JEDI", EpisodeCode(6))
        .build();

    let query = t.query_type().fields(move |_, f| {
        f.field("echo", non_null(episode), |_, args, _| {
            args.get::<EpisodeCode>("episode")
        })
        .argument(arg("episode", non_null(episode)));
        f.field("code", non_null(INT), |_, args, _| {
            args.get::<EpisodeCode>("episode").map(|e| e.0)
        })
        .argument(default_arg("episode", episode, EpisodeCode(5)));
    });
    t.compile(SchemaDescription::new(query)).unwrap()
}

#[tokio::test]
async fn test_enum_round_trip() {
    let schema = episode_schema();

    let (data, errors) = run(&schema, "{ echo(episode: JEDI) code(episode: JEDI) }", ()).await;
    assert!(errors.is_empty(), "{errors:?}");
    assert_eq!(data, json!({ "echo": "JEDI", "code": 6 }));

    let (data, _) = run(&schema, "{ code }", ()).await;
    assert_eq!(data, json!({ "code": 5 }));
}

#[tokio::test]
async fn test_enum_variables_use_external_names() {
    let schema = episode_schema();
    let request = Request::new("query($e: Episode!) { echo(episode: $e) }")
        .variables(Variables::from_json(json!({ "e": "JEDI" })));

    let response = schema.execute(request, ()).await;
    assert!(response.errors.is_empty(), "{:?}", response.errors);
    assert_eq!(response.data.into_json().unwrap(), json!({ "echo": "JEDI" }));
}

#[tokio::test]
async fn test_enum_internal_value_is_not_an_input() {
    let schema = episode_schema();
    let response = schema.execute("{ echo(episode: 6) }", ()).await;
    assert!(!response.errors.is_empty());
    assert_eq!(response.data.into_json().unwrap(), Value::Null);
}

// =============================================================================
// Deferred fields
// =============================================================================

#[tokio::test]
async fn test_self_reference_thunk_runs_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let mut t = TypeFactory::<()>::new();
    let node = t.object_type::<Node>("Node").fields(move |this, f| {
        counter.fetch_add(1, Ordering::SeqCst);
        f.default_field("id", non_null(ID));
        f.field("parent", this, |n, _, _| {
            Ok(Node {
                id: format!("{}/..", n.id),
            })
        });
        f.field("children", non_null(list(non_null(this))), |n, _, _| {
            Ok(vec![Node {
                id: format!("{}/a", n.id),
            }])
        });
    });
    let query = t.query_type().fields(move |_, f| {
        f.field("root", node, |_, _, _| Ok(Node { id: "r".into() }));
        f.field("nodes", list(node), |_, _, _| Ok(Vec::<Node>::new()));
    });

    let first = t.compile(SchemaDescription::new(query)).unwrap();
    let second = t.compile(SchemaDescription::new(query)).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(first.sdl(), second.sdl());

    let (data, _) = run(&second, "{ root { id parent { id } children { id } } }", ()).await;
    assert_eq!(
        data,
        json!({ "root": { "id": "r", "parent": { "id": "r/.." }, "children": [{ "id": "r/a" }] } })
    );
}

#[tokio::test]
async fn test_forward_declared_types() {
    let mut t = TypeFactory::<()>::new();
    let report = t.declare_object::<Report>("Report");
    let query = t.query_type().fields(move |_, f| {
        f.field("report", non_null(report), |_, _, _| {
            Ok(Report {
                title: "Later".into(),
            })
        });
    });
    t.define_object(report).fields(|_, f| {
        f.default_field("title", non_null(STRING));
    });

    let schema = t.compile(SchemaDescription::new(query)).unwrap();
    let (data, _) = run(&schema, "{ report { title } }", ()).await;
    assert_eq!(data, json!({ "report": { "title": "Later" } }));
}

// =============================================================================
// Resolvers and context
// =============================================================================

struct Session {
    user: String,
    greeted: AtomicUsize,
}

#[tokio::test]
async fn test_context_async_resolvers_and_mutation() {
    let mut t = TypeFactory::<Arc<Session>>::new();
    let query = t.query_type().fields(|_, f| {
        f.field("user", non_null(STRING), |_, _, s| Ok(s.user.clone()));
        f.field_async("delayed", non_null(STRING), |_, args, _| {
            let text = args.get::<String>("text");
            async move {
                tokio::task::yield_now().await;
                text
            }
        })
        .argument(arg("text", non_null(STRING)));
    });
    let mutation = t.mutation_type().fields(|_, f| {
        f.field("greet", non_null(INT), |_, _, s: &Arc<Session>| -> FieldResult<i32> {
            let count = s.greeted.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(i32::try_from(count)?)
        });
    });
    let schema = t
        .compile(SchemaDescription::new(query).mutation(mutation))
        .unwrap();

    let session = Arc::new(Session {
        user: "leia".into(),
        greeted: AtomicUsize::new(0),
    });
    let (data, _) = run(
        &schema,
        r#"{ user delayed(text: "hi") }"#,
        Arc::clone(&session),
    )
    .await;
    assert_eq!(data, json!({ "user": "leia", "delayed": "hi" }));

    let (data, _) = run(&schema, "mutation { greet }", Arc::clone(&session)).await;
    assert_eq!(data, json!({ "greet": 1 }));
    assert_eq!(session.greeted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_resolver_error_is_isolated() {
    let mut t = TypeFactory::<()>::new();
    let query = t.query_type().fields(|_, f| {
        f.field("secret", STRING, |_, _, _| -> FieldResult<String> {
            Err("secret is secret".into())
        });
        f.field("open", STRING, |_, _, _| Ok("visible"));
    });
    let schema = t.compile(SchemaDescription::new(query)).unwrap();

    let response = schema.execute("{ secret open }", ()).await;
    assert_eq!(response.errors.len(), 1);
    assert_eq!(response.errors[0].message, "secret is secret");
    assert_eq!(response.errors[0].path, [PathSegment::Field("secret".into())]);
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "secret": null, "open": "visible" })
    );
}

#[tokio::test]
async fn test_depth_limit() {
    let mut t = TypeFactory::<()>::new();
    let node = t.object_type::<Node>("Node").fields(|this, f| {
        f.default_field("id", non_null(ID));
        f.field("parent", this, |n, _, _| Ok(n.clone()));
    });
    let query = t.query_type().fields(move |_, f| {
        f.field("root", node, |_, _, _| Ok(Node { id: "r".into() }));
    });
    let config = SchemaConfig::default().with_max_depth(2);
    let schema = t
        .compile(SchemaDescription::new(query).config(config))
        .unwrap();

    let response = schema.execute("{ root { parent { parent { id } } } }", ()).await;
    assert!(!response.errors.is_empty());

    let response = schema.execute("{ root { id } }", ()).await;
    assert!(response.errors.is_empty());
}
