use anyhow::Context;
use clap::{Parser, Subcommand};
use postgres::{Client, NoTls};

#[derive(Parser)]
#[clap(name = "manage", about = "Administrative tasks for the lorebook server")]
struct Opts {
    #[clap(subcommand)]
    subcmd: SubCommand,
}

#[derive(Subcommand)]
enum SubCommand {
    /// Create the database schema.
    Init {
        /// Overrides the DATABASE_URL environment variable.
        database_url: Option<String>,
    },
    /// Grant the admin role to an existing user.
    Promote { email: String },
}

fn connect(database_url: Option<String>) -> Result<Client, anyhow::Error> {
    let database_url = database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .context("no database URL, pass one or set DATABASE_URL")?;
    Ok(Client::connect(&database_url, NoTls)?)
}

fn main() -> Result<(), anyhow::Error> {
    dotenv::dotenv().ok();
    let opts: Opts = Opts::parse();

    match opts.subcmd {
        SubCommand::Init { database_url } => {
            println!("initializing database");
            let mut client = connect(database_url)?;
            client.batch_execute(include_str!("../schema.sql"))?;
        }
        SubCommand::Promote { email } => {
            let mut client = connect(None)?;
            let email = email.to_lowercase();
            let updated = client.execute("UPDATE users SET role = 'admin' WHERE email = $1", &[&email])?;
            if updated == 0 {
                anyhow::bail!("no user with the address {}", email);
            }
            println!("{} is now an administrator", email);
        }
    }
    Ok(())
}
