use clap::{Args, Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "recipes-cli")]
#[command(about = "Command line client for the recipes API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a recipe
    Create(RecipeArgs),
    /// List every recipe
    List,
    /// Show one recipe
    Get { id: String },
    /// Replace the fields of an existing recipe
    Update {
        id: String,
        #[command(flatten)]
        recipe: RecipeArgs,
    },
    /// Delete a recipe
    Delete { id: String },
    /// Find recipes carrying a tag
    Search { tag: String },
}

#[derive(Args)]
struct RecipeArgs {
    name: String,

    /// Repeat for each tag
    #[arg(short, long = "tag")]
    tags: Vec<String>,

    /// Repeat for each ingredient
    #[arg(short, long = "ingredient")]
    ingredients: Vec<String>,

    /// Repeat for each step, in order
    #[arg(short = 's', long = "instruction")]
    instructions: Vec<String>,
}

impl RecipeArgs {
    fn body(&self) -> Value {
        json!({
            "name": self.name,
            "tags": self.tags,
            "ingredients": self.ingredients,
            "instructions": self.instructions,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = format!("{}/api/v1/recipes", cli.url.trim_end_matches('/'));

    let res = match cli.command {
        Commands::Create(recipe) => client.post(&base).json(&recipe.body()).send().await?,
        Commands::List => client.get(&base).send().await?,
        Commands::Get { id } => client.get(format!("{}/{}", base, id)).send().await?,
        Commands::Update { id, recipe } => {
            client
                .put(format!("{}/{}", base, id))
                .json(&recipe.body())
                .send()
                .await?
        }
        Commands::Delete { id } => client.delete(format!("{}/{}", base, id)).send().await?,
        Commands::Search { tag } => {
            client
                .get(format!("{}/search", base))
                .query(&[("tag", tag)])
                .send()
                .await?
        }
    };
    print_response(res).await?;

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: recipes API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
