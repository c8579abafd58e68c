//! Manage saved watermark templates.

use clap::Subcommand;

use photomark_common::config::AppConfig;
use photomark_watermark_model::template::TemplateStore;

use super::watermark::{resolve_config, WatermarkArgs};

#[derive(Subcommand)]
pub enum TemplateAction {
    /// Save the effective configuration under a name (overwrites)
    Save {
        name: String,

        /// Base the template on another saved template
        #[arg(short, long)]
        template: Option<String>,

        #[command(flatten)]
        watermark: WatermarkArgs,
    },

    /// List saved template names
    List,

    /// Print one template as JSON
    Show { name: String },

    /// Delete a template
    Delete { name: String },
}

pub fn run(app: &AppConfig, action: TemplateAction) -> anyhow::Result<()> {
    let path = app.templates_path();
    match action {
        TemplateAction::Save {
            name,
            template,
            watermark,
        } => {
            let cfg = resolve_config(app, template.as_deref(), &watermark)?;
            let mut store = TemplateStore::load(&path);
            store.insert(&name, cfg);
            store.save(&path)?;
            println!("Template '{name}' saved");
        }
        TemplateAction::List => {
            let store = TemplateStore::load(&path);
            if store.is_empty() {
                println!("No templates saved");
            } else {
                for name in store.names() {
                    println!("{name}");
                }
            }
        }
        TemplateAction::Show { name } => {
            let store = TemplateStore::load(&path);
            match store.get(&name) {
                Some(cfg) => println!("{}", serde_json::to_string_pretty(cfg)?),
                None => return Err(anyhow::anyhow!("Unknown template: {name}")),
            }
        }
        TemplateAction::Delete { name } => {
            let mut store = TemplateStore::load(&path);
            if store.remove(&name).is_none() {
                return Err(anyhow::anyhow!("Unknown template: {name}"));
            }
            store.save(&path)?;
            println!("Template '{name}' deleted");
        }
    }
    Ok(())
}
