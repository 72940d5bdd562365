use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Migrate every entity, geography before partners
    Migrate,

    /// Re-run a single entity
    Entity {
        #[arg(long, help = "Entity name, e.g. partners or cliFornec")]
        name: String,
    },

    /// Check that the legacy store and the target database are reachable
    TestConn,

    /// List the entities this tool migrates
    Entities,
}
