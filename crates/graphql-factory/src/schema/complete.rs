//! Per-field execution plans.
//!
//! A [`FieldPlan`] is what the engine calls for one field: it decodes the
//! arguments, runs the resolver and completes the result against the
//! declared type. Completion is where non-null, enum and abstract type
//! contracts are enforced for every value, whatever the resolver returned.
//!
//! Failures are reported at the smallest enclosing nullable position. A
//! failing list item in a nullable slot becomes `null`, a failing nullable
//! field becomes `null`, and a failing non-null field nulls the nearest
//! nullable ancestor through [`NullAnchors`].

use std::any::Any;
use std::sync::Arc;

use async_graphql::dynamic::{FieldValue, ObjectAccessor, ResolverContext};
use async_graphql::{Name, PathSegment, Pos, QueryPathSegment, Value};
use indexmap::IndexMap;

use super::dispatch::Dispatcher;
use super::propagate::{NullAnchors, PROPAGATED};
use crate::error::{FieldError, FieldResult};
use crate::factory::{EnumValues, Predicate, Resolver};
use crate::types::value::ModelRef;
use crate::types::{Args, Input, Resolved, ScalarType};

/// How a resolved value is turned into an engine value.
pub(crate) enum OutputPlan {
    NonNull(Box<OutputPlan>),
    List(Box<OutputPlan>),
    Scalar(ScalarType),
    Enum(Arc<EnumValues>),
    Object {
        name: String,
        is_type_of: Option<Predicate>,
    },
    /// Interface or union.
    Abstract(Arc<Dispatcher>),
}

/// How an argument value is decoded. Non-null wrappers are checked by the engine.
pub(crate) enum InputPlan {
    Scalar,
    Enum(Arc<EnumValues>),
    List(Box<InputPlan>),
}

pub(crate) struct ArgPlan {
    pub(crate) name: String,
    pub(crate) input: InputPlan,
    pub(crate) default: Option<Value>,
}

pub(crate) enum FieldSource<C> {
    Property {
        read: fn(&dyn Any, &str) -> Option<Resolved>,
        name: String,
    },
    Resolver(Resolver<C>),
}

pub(crate) struct FieldPlan<C> {
    /// `Type.field`, used in error messages.
    pub(crate) site: String,
    pub(crate) args: Vec<ArgPlan>,
    pub(crate) source: FieldSource<C>,
    pub(crate) output: OutputPlan,
}

/// An error together with the response path it belongs to.
#[derive(Debug)]
pub(crate) struct Located {
    pub(crate) path: Vec<PathSegment>,
    pub(crate) error: FieldError,
}

/// State threaded through the completion of one field value.
pub(crate) struct Completion<'s> {
    site: &'s str,
    /// Response path of the value being completed.
    path: Vec<PathSegment>,
    /// Path of the nearest nullable position enclosing `path`.
    anchor: Vec<PathSegment>,
    /// Errors already absorbed by nulling a nullable list item.
    absorbed: Vec<Located>,
    /// Null list items the engine cannot render itself.
    nulled: Vec<Vec<PathSegment>>,
}

/// Parent value of a list item that is nulled once execution finishes.
pub(crate) struct NullItem;

impl<'s> Completion<'s> {
    pub(crate) fn new(site: &'s str, path: Vec<PathSegment>, anchor: Vec<PathSegment>) -> Self {
        Self {
            site,
            path,
            anchor,
            absorbed: Vec::new(),
            nulled: Vec::new(),
        }
    }

    fn fail(&self, error: impl Into<FieldError>) -> Located {
        Located {
            path: self.path.clone(),
            error: error.into(),
        }
    }

    /// Engine value for a `null` item of a list of `plan`.
    ///
    /// The engine renders `null` items only for scalars. Other items get a
    /// placeholder and their path is kept for nulling after execution.
    fn null_item<'a>(&mut self, plan: &OutputPlan) -> FieldValue<'a> {
        let placeholder = match plan {
            OutputPlan::NonNull(_) | OutputPlan::Scalar(_) => return FieldValue::NULL,
            OutputPlan::List(_) => FieldValue::list(Vec::<FieldValue<'a>>::new()),
            OutputPlan::Enum(values) => match values.values.first() {
                Some(value) => FieldValue::value(Value::Enum(Name::new(&value.name))),
                None => return FieldValue::NULL,
            },
            OutputPlan::Object { .. } => FieldValue::owned_any(NullItem),
            OutputPlan::Abstract(dispatcher) => match dispatcher.candidate_names().next() {
                Some(name) => FieldValue::owned_any(NullItem).with_type(name.to_string()),
                None => return FieldValue::NULL,
            },
        };
        self.nulled.push(self.path.clone());
        placeholder
    }

    /// Absorbed item errors and the paths of placeholder items.
    pub(crate) fn finish(self) -> (Vec<Located>, Vec<Vec<PathSegment>>) {
        (self.absorbed, self.nulled)
    }
}

fn parent_of<'v>(ctx: &'v ResolverContext<'_>) -> &'v dyn Any {
    match ctx.parent_value.downcast_ref::<ModelRef>() {
        Some(parent) => parent.model.as_ref(),
        None => &(),
    }
}

/// Nearest nullable position at or above the parent object; the root is `data`.
fn parent_anchor(ctx: &ResolverContext<'_>) -> Vec<PathSegment> {
    match ctx.parent_value.downcast_ref::<ModelRef>() {
        Some(parent) => parent.anchor.to_vec(),
        None => Vec::new(),
    }
}

fn field_path(ctx: &ResolverContext<'_>) -> Vec<PathSegment> {
    let Some(node) = ctx.path_node.as_ref() else {
        return Vec::new();
    };
    let mut path: Vec<_> = std::iter::once(node)
        .chain(node.parents())
        .map(|node| match node.segment {
            QueryPathSegment::Name(name) => PathSegment::Field(name.to_string()),
            QueryPathSegment::Index(index) => PathSegment::Index(index),
        })
        .collect();
    path.reverse();
    path
}

impl<C: Send + Sync + 'static> FieldPlan<C> {
    pub(crate) async fn resolve<'a>(
        &self,
        ctx: ResolverContext<'a>,
    ) -> FieldResult<Option<FieldValue<'a>>> {
        if ctx.parent_value.downcast_ref::<NullItem>().is_some() {
            return if self.output.is_non_null() {
                Err(FieldError::new(PROPAGATED))
            } else {
                Ok(None)
            };
        }

        let path = field_path(&ctx);
        let produced = self.produce(&ctx).await;

        let mut completion = Completion::new(&self.site, path.clone(), parent_anchor(&ctx));
        let result = match produced {
            Ok(value) => complete(&self.output, value, &mut completion),
            Err(error) => Err(Located { path, error }),
        };

        let pos = ctx.item.pos;
        let anchors = ctx.data_opt::<NullAnchors>();
        let (absorbed, nulled) = completion.finish();
        for failure in absorbed {
            report(&ctx, failure, pos);
        }
        if let Some(anchors) = anchors {
            nulled.into_iter().for_each(|path| anchors.record(path));
        }

        match result {
            Ok(value) => Ok(value),
            Err(failure) => {
                report(&ctx, failure, pos);
                if !self.output.is_non_null() {
                    return Ok(None);
                }
                if let Some(anchors) = anchors {
                    anchors.record(parent_anchor(&ctx));
                }
                Err(FieldError::new(PROPAGATED))
            }
        }
    }

    async fn produce(&self, ctx: &ResolverContext<'_>) -> FieldResult<Resolved> {
        let pending = {
            let parent = parent_of(ctx);
            match &self.source {
                FieldSource::Property { read, name } => {
                    return Ok(read(parent, name).unwrap_or(Resolved::Null));
                }
                FieldSource::Resolver(resolve) => {
                    let args = decode_args(&self.args, &ctx.args)?;
                    let context = ctx.data::<C>()?;
                    resolve(parent, &args, context)
                }
            }
        };
        pending.await
    }
}

fn report(ctx: &ResolverContext<'_>, failure: Located, pos: Pos) {
    let mut error = failure.error.into_server_error(pos);
    error.path = failure.path;
    ctx.add_error(error);
}

fn decode_args(plans: &[ArgPlan], accessor: &ObjectAccessor<'_>) -> FieldResult<Args> {
    let mut values = IndexMap::with_capacity(plans.len());
    for plan in plans {
        let input = match accessor.get(&plan.name) {
            Some(value) => decode(&plan.input, value.as_value())?,
            None => match &plan.default {
                Some(default) => decode(&plan.input, default)?,
                None => Input::Null,
            },
        };
        values.insert(plan.name.clone(), input);
    }
    Ok(Args::new(values))
}

/// Decodes an argument value, translating enum names to internal values.
pub(crate) fn decode(plan: &InputPlan, value: &Value) -> FieldResult<Input> {
    if matches!(value, Value::Null) {
        return Ok(Input::Null);
    }
    match plan {
        InputPlan::Scalar => Ok(Input::Value(value.clone())),
        InputPlan::Enum(values) => {
            let name = match value {
                Value::Enum(name) => name.as_str(),
                Value::String(name) => name.as_str(),
                other => return Err(FieldError::new(format!("{other} is not an enum value"))),
            };
            values
                .parse(name)
                .map(Input::Leaf)
                .ok_or_else(|| FieldError::new(format!("unknown enum value `{name}`")))
        }
        InputPlan::List(inner) => match value {
            Value::List(items) => items
                .iter()
                .map(|item| decode(inner, item))
                .collect::<FieldResult<Vec<_>>>()
                .map(Input::List),
            single => Ok(Input::List(vec![decode(inner, single)?])),
        },
    }
}

/// Checks a resolved value against its declared type and converts it.
///
/// `Ok(None)` is a null in a nullable position.
pub(crate) fn complete<'a>(
    plan: &OutputPlan,
    value: Resolved,
    cx: &mut Completion<'_>,
) -> Result<Option<FieldValue<'a>>, Located> {
    if let OutputPlan::NonNull(inner) = plan {
        return match complete_value(inner, value, cx)? {
            Some(value) => Ok(Some(value)),
            None => Err(cx.fail(format!(
                "Cannot return null for non-nullable field {}.",
                cx.site
            ))),
        };
    }
    let outer = std::mem::replace(&mut cx.anchor, cx.path.clone());
    let completed = complete_value(plan, value, cx);
    cx.anchor = outer;
    completed
}

fn complete_value<'a>(
    plan: &OutputPlan,
    value: Resolved,
    cx: &mut Completion<'_>,
) -> Result<Option<FieldValue<'a>>, Located> {
    if value.is_null() {
        return Ok(None);
    }

    match (plan, value) {
        (OutputPlan::NonNull(_), value) => complete(plan, value, cx),
        (OutputPlan::List(inner), Resolved::List(items)) => {
            let mut completed = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                cx.path.push(PathSegment::Index(index));
                let item = match complete(inner, item, cx) {
                    Ok(Some(item)) => Ok(item),
                    Ok(None) => Ok(cx.null_item(inner)),
                    Err(failure) if !inner.is_non_null() => {
                        cx.absorbed.push(failure);
                        Ok(cx.null_item(inner))
                    }
                    Err(failure) => Err(failure),
                };
                cx.path.pop();
                completed.push(item?);
            }
            Ok(Some(FieldValue::list(completed)))
        }
        (OutputPlan::Scalar(scalar), Resolved::Value(value)) => {
            complete_scalar(*scalar, value, cx.site)
                .map(|v| Some(FieldValue::value(v)))
                .map_err(|err| cx.fail(err))
        }
        (OutputPlan::Enum(values), Resolved::Leaf(leaf)) => match values.name_of(&*leaf) {
            Some(name) => Ok(Some(FieldValue::value(Value::Enum(Name::new(name))))),
            None => Err(cx.fail(format!("{}: enum value has no external name", cx.site))),
        },
        (OutputPlan::Enum(values), Resolved::Value(Value::Enum(name)))
            if values.parse(name.as_str()).is_some() =>
        {
            Ok(Some(FieldValue::value(Value::Enum(name))))
        }
        (OutputPlan::Object { name, is_type_of }, Resolved::Model(model)) => {
            if let Some(is_type_of) = is_type_of
                && !is_type_of(model.as_ref())
            {
                return Err(cx.fail(format!("{}: expected value of type {name}", cx.site)));
            }
            Ok(Some(FieldValue::owned_any(ModelRef::new(model, &cx.anchor))))
        }
        (OutputPlan::Abstract(dispatcher), Resolved::Model(model)) => {
            let name = dispatcher
                .resolve(model.as_ref())
                .map_err(|err| cx.fail(err))?
                .to_string();
            Ok(Some(
                FieldValue::owned_any(ModelRef::new(model, &cx.anchor)).with_type(name),
            ))
        }
        (plan, value) => Err(cx.fail(format!(
            "{}: expected {}, found {}",
            cx.site,
            plan.expected(),
            kind_of(&value)
        ))),
    }
}

fn complete_scalar(scalar: ScalarType, value: Value, site: &str) -> FieldResult<Value> {
    match (scalar, value) {
        (ScalarType::String, value @ Value::String(_))
        | (ScalarType::Boolean, value @ Value::Boolean(_))
        | (ScalarType::Float, value @ Value::Number(_))
        | (ScalarType::Id, value @ Value::String(_)) => Ok(value),
        (ScalarType::Int, Value::Number(n))
            if n.as_i64().is_some_and(|i| i32::try_from(i).is_ok()) =>
        {
            Ok(Value::Number(n))
        }
        (ScalarType::Id, Value::Number(n)) if n.is_i64() || n.is_u64() => {
            Ok(Value::String(n.to_string()))
        }
        (scalar, other) => Err(FieldError::new(format!(
            "{site}: expected {scalar}, found {other}"
        ))),
    }
}

impl OutputPlan {
    pub(crate) fn is_non_null(&self) -> bool {
        matches!(self, Self::NonNull(_))
    }

    fn expected(&self) -> &'static str {
        match self {
            Self::NonNull(inner) => inner.expected(),
            Self::List(_) => "a list",
            Self::Scalar(_) => "a scalar",
            Self::Enum(_) => "an enum value",
            Self::Object { .. } | Self::Abstract(_) => "an object",
        }
    }
}

fn kind_of(value: &Resolved) -> &'static str {
    match value {
        Resolved::Null => "null",
        Resolved::Value(_) => "a scalar",
        Resolved::Leaf(_) => "an enum value",
        Resolved::List(_) => "a list",
        Resolved::Model(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i32) -> Resolved {
        Resolved::Value(Value::Number(n.into()))
    }

    fn non_null(plan: OutputPlan) -> OutputPlan {
        OutputPlan::NonNull(Box::new(plan))
    }

    fn list(plan: OutputPlan) -> OutputPlan {
        OutputPlan::List(Box::new(plan))
    }

    fn at(field: &str) -> Vec<PathSegment> {
        vec![PathSegment::Field(field.to_string())]
    }

    fn run(
        plan: &OutputPlan,
        value: Resolved,
        site: &str,
    ) -> (Result<Option<FieldValue<'static>>, Located>, Vec<Located>) {
        let mut cx = Completion::new(site, at("field"), Vec::new());
        let result = complete(plan, value, &mut cx);
        (result, cx.finish().0)
    }

    #[test]
    fn test_null_in_non_null_position() {
        let plan = non_null(OutputPlan::Scalar(ScalarType::String));
        let (result, _) = run(&plan, Resolved::Null, "Human.name");
        let failure = result.unwrap_err();
        assert_eq!(
            failure.error.message,
            "Cannot return null for non-nullable field Human.name."
        );
        assert_eq!(failure.path, at("field"));
    }

    #[test]
    fn test_null_item_in_non_null_list() {
        let plan = non_null(list(non_null(OutputPlan::Scalar(ScalarType::Int))));
        let value = Resolved::List(vec![int(1), Resolved::Null, int(3)]);
        let (result, absorbed) = run(&plan, value, "Query.numbers");
        let failure = result.unwrap_err();
        assert_eq!(
            failure.error.message,
            "Cannot return null for non-nullable field Query.numbers."
        );
        assert_eq!(
            failure.path,
            [PathSegment::Field("field".into()), PathSegment::Index(1)]
        );
        assert!(absorbed.is_empty());

        let value = Resolved::List(vec![int(1), int(3)]);
        assert!(run(&plan, value, "Query.numbers").0.unwrap().is_some());
    }

    #[test]
    fn test_nullable_items_allowed() {
        let plan = list(OutputPlan::Scalar(ScalarType::Int));
        let value = Resolved::List(vec![int(1), Resolved::Null]);
        assert!(run(&plan, value, "Query.numbers").0.unwrap().is_some());
        assert!(run(&plan, Resolved::Null, "Query.numbers").0.unwrap().is_none());
    }

    #[test]
    fn test_failing_nullable_item_is_absorbed() {
        let plan = non_null(list(OutputPlan::Scalar(ScalarType::Int)));
        let value = Resolved::List(vec![
            int(1),
            Resolved::Value(Value::String("two".into())),
            int(3),
        ]);
        let (result, absorbed) = run(&plan, value, "Query.numbers");

        assert!(result.unwrap().is_some());
        assert_eq!(absorbed.len(), 1);
        assert_eq!(
            absorbed[0].path,
            [PathSegment::Field("field".into()), PathSegment::Index(1)]
        );
        assert_eq!(
            absorbed[0].error.message,
            "Query.numbers: expected Int, found \"two\""
        );
    }

    #[test]
    fn test_object_anchor_is_nearest_nullable_position() {
        let object = || OutputPlan::Object {
            name: "Report".into(),
            is_type_of: None,
        };
        let anchor_of = |plan: &OutputPlan| {
            let mut cx = Completion::new("Query.reports", at("reports"), Vec::new());
            let value = Resolved::List(vec![Resolved::model(())]);
            let Some(list) = complete(plan, value, &mut cx).unwrap() else {
                panic!("expected a list");
            };
            let items = list.as_list().unwrap();
            items[0].downcast_ref::<ModelRef>().unwrap().anchor.to_vec()
        };

        assert_eq!(
            anchor_of(&non_null(list(object()))),
            [PathSegment::Field("reports".into()), PathSegment::Index(0)]
        );
        assert_eq!(anchor_of(&list(non_null(object()))), at("reports"));
        assert!(anchor_of(&non_null(list(non_null(object())))).is_empty());
    }

    #[test]
    fn test_scalar_kind_mismatch() {
        let plan = OutputPlan::Scalar(ScalarType::Int);
        let value = Resolved::Value(Value::String("x".into()));
        assert!(run(&plan, value, "Query.count").0.is_err());

        let value = Resolved::Value(Value::Number(i64::MAX.into()));
        assert!(run(&plan, value, "Query.count").0.is_err());
    }

    #[test]
    fn test_id_from_number() {
        let value = complete_scalar(ScalarType::Id, Value::Number(1000.into()), "Query.id");
        assert_eq!(value.unwrap(), Value::String("1000".into()));
    }

    #[test]
    fn test_list_decoding_wraps_single_values() {
        let plan = InputPlan::List(Box::new(InputPlan::Scalar));
        let input = decode(&plan, &Value::Number(4.into())).unwrap();
        assert!(matches!(input, Input::List(ref items) if items.len() == 1));
        assert!(matches!(decode(&plan, &Value::Null).unwrap(), Input::Null));
    }
}
