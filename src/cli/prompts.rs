use anyhow::Result;
use barq_client::storage::{PromptProfile, PromptProfileStore};

fn store() -> PromptProfileStore {
    PromptProfileStore::new(super::load_config(None).prompts_path())
}

pub fn show() -> Result<()> {
    let store = store();
    match store.load()? {
        Some(profile) => print_profile(&profile),
        None => {
            println!("No saved prompts found ({}). Defaults:", store.path().display());
            print_profile(&PromptProfile::default());
        }
    }
    Ok(())
}

pub fn save(retrieval: Option<&str>, synthesis: Option<&str>) -> Result<()> {
    let store = store();
    // Unspecified templates keep their current value
    let mut profile = store.load_or_default()?;
    if let Some(t) = retrieval {
        profile.retrieval_template = t.to_string();
    }
    if let Some(t) = synthesis {
        profile.synthesis_template = t.to_string();
    }
    store.save(&profile)?;
    println!("Prompts saved successfully to {}", store.path().display());
    Ok(())
}

fn print_profile(profile: &PromptProfile) {
    println!("Retrieval prompt:\n  {}", profile.retrieval_template);
    println!("Prompt template:\n  {}", profile.synthesis_template);
}
