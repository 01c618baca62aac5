//! Persona, key and contact commands.

use super::{render, ContactCommands, Context, KeyCommands, PromptCommands};
use crate::manage::{ApiKeyManager, ContactManager, PromptManager};
use anyhow::{bail, Result};
use inquire::{Confirm, Password, PasswordDisplayMode};
use std::path::PathBuf;

fn confirmed(question: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    Ok(Confirm::new(question).with_default(false).prompt()?)
}

async fn persona_text(content: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (content, file) {
        (Some(text), _) => Ok(text),
        (None, Some(path)) => Ok(tokio::fs::read_to_string(&path).await?),
        (None, None) => bail!("provide the persona instructions with --content or --file"),
    }
}

pub async fn prompts(ctx: &Context, cmd: &PromptCommands) -> Result<()> {
    let manager = PromptManager::new(ctx.client.clone());

    let prompts = match cmd {
        PromptCommands::List => manager.reload().await?,
        PromptCommands::Add { name, content, file } => {
            let text = persona_text(content.clone(), file.clone()).await?;
            manager.create(name, &text).await?
        }
        PromptCommands::Edit { id, name, content, file } => {
            let text = persona_text(content.clone(), file.clone()).await?;
            manager.update(id, name, &text).await?
        }
        PromptCommands::Activate { id } => manager.activate(id).await?,
        PromptCommands::Remove { id, yes } => {
            manager.reload().await?;
            let pending = manager.request_remove(id).await?;
            if !confirmed(&pending.prompt, *yes)? {
                manager.cancel_remove();
                println!("Nothing deleted.");
                return Ok(());
            }
            manager.confirm_remove().await?
        }
    };

    print!("{}", render::prompt_table(&prompts));
    Ok(())
}

pub async fn keys(ctx: &Context, cmd: &KeyCommands) -> Result<()> {
    let manager = ApiKeyManager::new(ctx.client.clone());
    let mut reveal = false;

    let keys = match cmd {
        KeyCommands::List { reveal: show } => {
            reveal = *show;
            manager.reload().await?
        }
        KeyCommands::Add { name, value } => {
            let value = match value {
                Some(value) => value.clone(),
                None => Password::new("API key:")
                    .with_display_mode(PasswordDisplayMode::Masked)
                    .without_confirmation()
                    .prompt()?,
            };
            manager.create(name, &value).await?
        }
        KeyCommands::Edit { id, name, value } => manager.update(id, name, value.as_deref()).await?,
        KeyCommands::Activate { id } => manager.activate(id).await?,
        KeyCommands::Remove { id, yes } => {
            manager.reload().await?;
            let pending = manager.request_remove(id).await?;
            if !confirmed(&pending.prompt, *yes)? {
                manager.cancel_remove();
                println!("Nothing deleted.");
                return Ok(());
            }
            manager.confirm_remove().await?
        }
    };

    print!("{}", render::key_table(&keys, reveal));
    Ok(())
}

pub async fn contacts(ctx: &Context, cmd: &ContactCommands) -> Result<()> {
    let manager = ContactManager::new(ctx.client.clone());

    let contacts = match cmd {
        ContactCommands::List => manager.reload().await?.0,
        ContactCommands::Add { number, name } => manager.add(number, name).await?,
        ContactCommands::Edit { jid, number, name } => manager.edit(jid, number, name).await?,
        ContactCommands::Remove { jid, yes } => {
            manager.reload().await?;
            let pending = manager.request_remove(jid).await?;
            if !confirmed(&pending.prompt, *yes)? {
                manager.cancel_remove();
                println!("Nothing removed.");
                return Ok(());
            }
            manager.confirm_remove().await?
        }
        ContactCommands::Mode { mode } => {
            manager.set_mode(*mode).await?;
            manager.reload().await?.0
        }
    };

    print!("{}", render::contact_table(&contacts, manager.mode().await));
    Ok(())
}
