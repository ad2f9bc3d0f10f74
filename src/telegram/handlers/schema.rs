//! Dispatcher schema

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::commands::handle_command;
use super::types::{HandlerDeps, HandlerError};
use super::uploads::upload_handler;
use crate::telegram::bot::Command;
use crate::telegram::Bot;

/// Creates the dispatcher schema for the bot.
///
/// Commands are matched first; any other message carrying a document,
/// photo, video or audio goes to the upload handler. Everything else is
/// ignored.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_uploads = deps;

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(upload_handler(deps_uploads))
}

fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message().branch(dptree::entry().filter_command::<Command>().endpoint(
        move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                log::info!("Received command: {:?} from chat {}", cmd, msg.chat.id);
                handle_command(&bot, &msg, cmd, &deps).await
            }
        },
    ))
}
