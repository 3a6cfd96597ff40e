//! The Star Wars schema: an `Episode` enum, a `Character` interface with its
//! `Human` and `Droid` implementations, and the root query.

use graphql_factory::{
    CompiledSchema, EnumType, FieldResult, ID, InterfaceType, ObjectFields, Result, STRING,
    SchemaConfig, SchemaDescription, TypeFactory, arg, default_arg, list, non_null,
};
use tracing::info;

use crate::data;
use crate::model::{Character, Context, Episode};

/// Builds and compiles the schema.
pub fn build_schema(config: SchemaConfig) -> Result<CompiledSchema<Context>> {
    let mut t = TypeFactory::<Context>::new();

    let episode = t
        .enum_type::<Episode>("Episode")
        .description("One of the films in the Star Wars Trilogy")
        .value("NEWHOPE", Episode::NewHope)
        .value("EMPIRE", Episode::Empire)
        .value("JEDI", Episode::Jedi)
        .describe("NEWHOPE", "Released in 1977.")
        .describe("EMPIRE", "Released in 1980.")
        .describe("JEDI", "Released in 1983.")
        .build();

    let character = t
        .interface_type::<Character>("Character")
        .description("A character in the Star Wars Trilogy")
        .fields(move |this, f| {
            f.field("id", non_null(ID))
                .description("The id of the character.");
            f.field("name", non_null(STRING))
                .description("The name of the character.");
            f.field("appearsIn", non_null(list(non_null(episode))))
                .description("Which movies they appear in.");
            f.field("friends", non_null(list(this)))
                .description("The friends of the character, or an empty list if they have none.");
        });

    let human = t
        .object_type::<Character>("Human")
        .description("A humanoid creature in the Star Wars universe.")
        .implements(character)
        .is_type_of(Character::is_human)
        .fields(move |_, f| {
            character_fields(f, character, episode);
            f.default_field("homePlanet", STRING)
                .description("The home planet of the human, or null if unknown.");
        });

    let droid = t
        .object_type::<Character>("Droid")
        .description("A mechanical creature in the Star Wars universe.")
        .implements(character)
        .is_type_of(Character::is_droid)
        .fields(move |_, f| {
            character_fields(f, character, episode);
            f.default_field("primaryFunction", non_null(STRING))
                .description("The primary function of the droid.");
        });

    let query = t.query_type().fields(move |_, f| {
        f.field("hero", character, |_, args, _| {
            Ok(data::hero(args.get::<Option<Episode>>("episode")?))
        })
        .argument(
            default_arg("episode", episode, Episode::Empire).description(
                "If omitted, returns the hero of The Empire Strikes Back. \
                 If provided, returns the hero of that particular episode.",
            ),
        );
        f.field("human", human, |_, args, _| {
            let id = args.get::<async_graphql::ID>("id")?;
            Ok(data::human_by_id(&id))
        })
        .argument(arg("id", non_null(ID)).description("id of the human"));
        f.field("droid", droid, |_, args, _| {
            let id = args.get::<String>("id")?;
            Ok(data::droid_by_id(&id))
        })
        .argument(arg("id", non_null(STRING)).description("ID of the droid"));
        f.field("contextContent", STRING, |_, _, ctx: &Context| {
            Ok(ctx.content.clone())
        });
    });

    let schema = t.compile(SchemaDescription::new(query).config(config))?;
    info!(types = schema.type_names().len(), "Star Wars schema ready");
    Ok(schema)
}

/// Fields shared by every implementation of `Character`.
fn character_fields(
    f: &mut ObjectFields<Character, Context>,
    character: InterfaceType<Character>,
    episode: EnumType<Episode>,
) {
    f.default_field("id", non_null(ID))
        .description("The id of the character.");
    f.default_field("name", non_null(STRING))
        .description("The name of the character.");
    f.default_field("appearsIn", non_null(list(non_null(episode))))
        .description("Which movies they appear in.");
    f.field_async("friends", non_null(list(character)), |c, _, _| {
        let ids = c.friends.clone();
        async move { FieldResult::Ok(data::characters(&ids).await) }
    })
    .description("The friends of the character, or an empty list if they have none.");
    f.field("secretBackStory", STRING, |_, _, _| -> FieldResult<String> {
        Err("secretBackstory is secret".into())
    })
    .description("Where are they from and how they came to be who they are.");
}
