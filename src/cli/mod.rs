use anyhow::{Context, Result};
use chrono::Utc;
use colored::*;
use std::io::{self, Write};
use std::path::Path;

use crate::companion::{Companion, CompanionEvent, CompanionFormatter, TurnOutcome};
use crate::config::Config;
use crate::core::{Attachment, AttachmentKind, CharacterProfile, Message, SqliteStore};
use crate::scheduler::EventScheduler;
use crate::transport::ProviderClient;

pub use commands::{Args, CharacterCommands, Commands, DiaryCommands};

mod commands;

pub async fn run(args: Args, config: Config) -> Result<()> {
    match args.command {
        Commands::Character { command } => handle_character(command, &config),
        Commands::Chat {
            message: Some(message),
            provider,
            model,
            image,
            audio,
        } => {
            let attachment = match (image, audio) {
                (Some(path), _) => Some(attachment_from(AttachmentKind::Image, &path)?),
                (None, Some(path)) => Some(attachment_from(AttachmentKind::Audio, &path)?),
                (None, None) => None,
            };
            handle_chat(&config, &message, attachment, provider, model).await
        }
        Commands::Chat {
            message: None,
            provider,
            model,
            ..
        } => handle_conversation(&config, provider, model).await,
        Commands::Status => handle_status(&config),
        Commands::Diary { command } => handle_diary(command, &config),
        Commands::Tick => handle_tick(&config),
        Commands::Watch => handle_watch(&config).await,
    }
}

fn attachment_from(kind: AttachmentKind, path: &Path) -> Result<Attachment> {
    anyhow::ensure!(path.is_file(), "No such file: {}", path.display());
    Ok(Attachment::from_path(kind, path))
}

fn open_companion(config: &Config) -> Result<Companion<SqliteStore>> {
    let store = SqliteStore::new(config.database_file())
        .with_context(|| format!("Failed to open {}", config.database_file().display()))?;
    Companion::open(store, &config.relationship).context("Failed to load companion state")
}

fn require_character(companion: &Companion<SqliteStore>) -> Result<&CharacterProfile> {
    companion.character().ok_or_else(|| {
        anyhow::anyhow!("No character yet. Create one with `aicompanion character create <name>`.")
    })
}

fn handle_character(command: CharacterCommands, config: &Config) -> Result<()> {
    let mut companion = open_companion(config)?;

    match command {
        CharacterCommands::Create {
            name,
            personality,
            interests,
            age,
            speaking_style,
            birthday,
        } => {
            let mut profile = CharacterProfile::new(name)
                .with_personality(personality)
                .with_interests(interests)
                .with_age(age)
                .with_speaking_style(speaking_style);
            if let Some(birthday) = birthday {
                profile = profile.with_birthday(birthday);
            }

            companion.create_character(profile)?;
            let character = require_character(&companion)?;
            println!("{} {}", "✨ Created".green().bold(), character.name.bold());
        }
        CharacterCommands::Show => {
            let character = require_character(&companion)?;
            println!("{}", character.name.cyan().bold());
            println!("  Age: {}", character.age);
            if !character.personality.is_empty() {
                println!("  Personality: {}", character.personality);
            }
            if !character.interests.is_empty() {
                println!("  Interests: {}", character.interests);
            }
            if !character.speaking_style.is_empty() {
                println!("  Speaking style: {}", character.speaking_style);
            }
            if let Some(birthday) = character.birthday {
                println!("  Birthday: {}", birthday.format("%d/%m"));
            }
        }
        CharacterCommands::Edit {
            name,
            personality,
            interests,
            age,
            speaking_style,
            birthday,
        } => {
            let mut profile = require_character(&companion)?.clone();
            if let Some(name) = name {
                profile.name = name;
            }
            if let Some(personality) = personality {
                profile.personality = personality;
            }
            if let Some(interests) = interests {
                profile.interests = interests;
            }
            if let Some(age) = age {
                profile.age = age;
            }
            if let Some(style) = speaking_style {
                profile.speaking_style = style;
            }
            if birthday.is_some() {
                profile.birthday = birthday;
            }

            companion.update_character(profile)?;
            println!("{}", "Character updated.".green());
        }
        CharacterCommands::Delete { yes } => {
            let name = require_character(&companion)?.name.clone();
            if !yes && !confirm(&format!("Delete {} and forget everything?", name))? {
                println!("{}", "Cancelled.".yellow());
                return Ok(());
            }
            companion.delete_character()?;
            println!("{} {}", "🗑️  Deleted".red(), name);
        }
    }

    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{} [y/N] ", question);
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn handle_chat(
    config: &Config,
    message: &str,
    attachment: Option<Attachment>,
    provider: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let mut companion = open_companion(config)?;
    require_character(&companion)?;
    let client = ProviderClient::new(config.get_ai_config(provider, model)?)?;

    let mut message = Message::user(message);
    if let Some(attachment) = attachment {
        message = message.with_attachment(attachment);
    }
    chat_once(&mut companion, &client, message).await
}

async fn handle_conversation(
    config: &Config,
    provider: Option<String>,
    model: Option<String>,
) -> Result<()> {
    let mut companion = open_companion(config)?;
    let name = require_character(&companion)?.name.clone();
    let client = ProviderClient::new(config.get_ai_config(provider, model)?)?;

    println!("{}", format!("Chatting with {}.", name).cyan());
    println!("{}", "Type 'exit', 'quit', or 'bye' to end conversation.".yellow());
    println!("{}", "---".dimmed());

    loop {
        print!("{} ", "You:".cyan().bold());
        io::stdout().flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            break;
        }
        let input = input.trim();

        if matches!(input.to_lowercase().as_str(), "exit" | "quit" | "bye") {
            println!("{}", "Goodbye! 👋".green());
            break;
        }
        if input.is_empty() {
            continue;
        }

        chat_once(&mut companion, &client, Message::user(input)).await?;
        println!();
    }

    Ok(())
}

async fn chat_once(
    companion: &mut Companion<SqliteStore>,
    client: &ProviderClient,
    message: Message,
) -> Result<()> {
    let name = require_character(companion)?.name.clone();
    let turn = companion.send(client, message).await?;

    print_outcome(&turn.user);
    let reply = format!("{}:", name);
    if turn.fallback {
        println!("{} {}", reply.yellow().bold(), turn.reply.message.content);
    } else {
        println!("{} {}", reply.green().bold(), turn.reply.message.content);
    }
    print_outcome(&turn.reply);

    Ok(())
}

fn print_outcome(outcome: &TurnOutcome) {
    if let Some(change) = outcome.change {
        let applied = change.applied();
        if applied > 0 {
            println!("{}", format!("  └─ (+{} intimacy, {})", applied, outcome.emotion).green().dimmed());
        } else if applied < 0 {
            println!("{}", format!("  └─ ({} intimacy, {})", applied, outcome.emotion).red().dimmed());
        }

        if change.tier_changed {
            let line = format!(
                "  {} {} → {} {}",
                change.from_tier.emoji(),
                change.from_tier.label(),
                change.to_tier.emoji(),
                change.to_tier.label()
            );
            if change.is_level_up() {
                println!("{}", line.magenta().bold());
            } else {
                println!("{}", line.red());
            }
        }
    }

    if let Some(milestone) = outcome.milestone {
        println!(
            "{}",
            format!("  🎉 New milestone: {} {}", milestone.tier.emoji(), milestone.tier.label())
                .magenta()
                .bold()
        );
    }
    if let Some(entry) = &outcome.diary_entry {
        println!("{}", format!("  📔 Diary: {}", entry.title).blue());
    }
    if let Some(scripted) = &outcome.scripted_message {
        println!("{}", scripted.content.magenta());
    }
}

fn handle_status(config: &Config) -> Result<()> {
    let companion = open_companion(config)?;
    println!("{}", CompanionFormatter::format_status(&companion));
    Ok(())
}

fn handle_diary(command: DiaryCommands, config: &Config) -> Result<()> {
    let mut companion = open_companion(config)?;

    match command {
        DiaryCommands::List { limit } => {
            if companion.diary().is_empty() {
                println!("{}", "The diary is empty.".yellow());
                return Ok(());
            }
            println!(
                "{}",
                format!(
                    "📔 Diary ({}/{})",
                    companion.diary().len(),
                    companion.diary().capacity()
                )
                .cyan()
                .bold()
            );
            for entry in companion.diary().newest_first().take(limit) {
                println!("{}\n", CompanionFormatter::format_diary_entry(entry));
            }
        }
        DiaryCommands::Add { title, content } => {
            let entry = companion.add_diary_entry(&title, &content)?;
            println!("{} {}", "Saved".green(), entry.id.dimmed());
        }
        DiaryCommands::Delete { id } => {
            let entry = companion.delete_diary_entry(&id)?;
            println!("{} {}", "Deleted".red(), entry.title);
        }
    }

    Ok(())
}

fn handle_tick(config: &Config) -> Result<()> {
    let mut companion = open_companion(config)?;
    let events = companion.tick(Utc::now())?;

    if events.is_empty() {
        println!("{}", "Nothing new.".dimmed());
    }
    for event in &events {
        print_event(event);
    }
    Ok(())
}

async fn handle_watch(config: &Config) -> Result<()> {
    let mut companion = open_companion(config)?;
    require_character(&companion)?;

    let mut scheduler = EventScheduler::new(&config.scheduler, Utc::now());
    println!("{}", "Watching for special dates and reminders (Ctrl-C to stop)...".cyan());
    scheduler.run(&mut companion, print_event).await
}

fn print_event(event: &CompanionEvent) {
    match event {
        CompanionEvent::SpecialDate { event, message, .. } => {
            println!("{}", format!("🎊 {}", event.name).magenta().bold());
            println!("{}", message.content);
        }
        CompanionEvent::Reminder { message } => {
            println!("{} {}", "💌".magenta(), message.content);
        }
    }
}
