use anyhow::Result;

use crate::engine::command::{ChoiceValue, CommandDefinition, CommandOption, OptionType};
use crate::engine::handler::handler_fn;
use crate::engine::interaction::Interaction;
use crate::engine::response::CommandResult;

const MAX_BOOPS: i64 = 10;

pub fn definition() -> CommandDefinition {
    CommandDefinition::new(
        "boop",
        "Boops the specified user, as many times as you want",
        handler_fn(|interaction| async move { boop(&interaction) }),
    )
    .option(CommandOption::new("user", "The user to boop", OptionType::User).required())
    .option(CommandOption::new(
        "boop_amount",
        "How many times should the user be booped (defaults to 1)",
        OptionType::Integer,
    ))
    .option(
        CommandOption::new(
            "boop_reminder",
            "How often should we remind you to boop the user",
            OptionType::Integer,
        )
        .choice("Every day", ChoiceValue::Integer(1))
        .choice("Weekly", ChoiceValue::Integer(7)),
    )
}

fn boop(interaction: &Interaction) -> Result<CommandResult> {
    let amount = interaction
        .integer_option("boop_amount")
        .unwrap_or(1)
        .clamp(1, MAX_BOOPS);
    let boops = vec!["boop"; amount as usize].join(" ");
    Ok(CommandResult::Text(boops))
}
