//! Command handler implementations

use teloxide::prelude::*;
use teloxide::types::{FileId, InputFile, Message};

use super::types::{caller_id, HandlerDeps, HandlerError};
use crate::core::error::AppError;
use crate::storage::{FileKind, FileLink};
use crate::telegram::admin::handle_admin_command;
use crate::telegram::bot::Command;
use crate::telegram::markdown::send_message_markdown_v2;
use crate::telegram::messages;
use crate::telegram::Bot;

/// Routes a parsed command
pub(super) async fn handle_command(bot: &Bot, msg: &Message, cmd: Command, deps: &HandlerDeps) -> Result<(), HandlerError> {
    match cmd {
        Command::Start(payload) => handle_start_command(bot, msg, payload.trim(), deps).await,
        Command::Help => {
            send_message_markdown_v2(bot, msg.chat.id, messages::help_markdown(), None).await?;
            Ok(())
        }
        Command::Status => handle_status_command(bot, msg, deps).await,
        Command::Plan => handle_plan_command(bot, msg, deps).await,
        Command::MyId => {
            let user_id = caller_id(msg).unwrap_or(msg.chat.id.0);
            send_message_markdown_v2(bot, msg.chat.id, messages::my_id_markdown(user_id), None).await?;
            Ok(())
        }
        admin_cmd => handle_admin(bot, msg, &admin_cmd, deps).await,
    }
}

/// /start with a code resends the stored file; without one shows the welcome
async fn handle_start_command(bot: &Bot, msg: &Message, code: &str, deps: &HandlerDeps) -> Result<(), HandlerError> {
    if !code.is_empty() {
        match deps.store.require_file(code) {
            Ok(link) => {
                log::info!("Resolving code {} for chat {}", code, msg.chat.id);
                send_stored_file(bot, msg.chat.id, &link).await?;
            }
            Err(AppError::NotFound(code)) => {
                log::info!("Unknown code {:?} requested by chat {}", code, msg.chat.id);
                bot.send_message(msg.chat.id, messages::FILE_NOT_FOUND).await?;
            }
            Err(e) => return Err(e.into()),
        }
        return Ok(());
    }

    let user_id = caller_id(msg).unwrap_or(msg.chat.id.0);
    let entitlement = deps.store.check_entitlement(user_id)?;
    bot.send_message(msg.chat.id, messages::welcome_text(&entitlement)).await?;
    Ok(())
}

/// Sends a file by its Telegram reference using the method for its kind.
/// Falls back to a plain document if the kind-specific call is rejected.
async fn send_stored_file(bot: &Bot, chat_id: ChatId, link: &FileLink) -> Result<(), HandlerError> {
    let input = || InputFile::file_id(FileId(link.file_ref.clone()));

    let sent = match link.file_kind {
        FileKind::Photo => bot.send_photo(chat_id, input()).await.map(|_| ()),
        FileKind::Video => bot.send_video(chat_id, input()).await.map(|_| ()),
        FileKind::Audio => bot.send_audio(chat_id, input()).await.map(|_| ()),
        FileKind::Document => bot.send_document(chat_id, input()).await.map(|_| ()),
    };

    match sent {
        Ok(()) => Ok(()),
        Err(e) if link.file_kind != FileKind::Document => {
            log::warn!(
                "Sending {} for code {} failed ({}), retrying as document",
                link.file_kind,
                link.code,
                e
            );
            bot.send_document(chat_id, input()).await?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn handle_status_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let user_id = caller_id(msg).unwrap_or(msg.chat.id.0);
    let entitlement = deps.store.check_entitlement(user_id)?;
    send_message_markdown_v2(bot, msg.chat.id, messages::status_markdown(&entitlement), None).await?;
    Ok(())
}

async fn handle_plan_command(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let upi = deps.store.upi_id()?;
    let username = deps.store.admin_username()?;
    let template = deps
        .store
        .plans_text()?
        .unwrap_or_else(|| messages::DEFAULT_PLANS_TEMPLATE.to_string());

    let text = messages::render_plan_text(&template, &upi, &username);
    let mut req = bot.send_message(msg.chat.id, text);
    if let Some(keyboard) = messages::contact_keyboard("📩 Contact Admin", &username) {
        req = req.reply_markup(keyboard);
    }
    req.await?;
    Ok(())
}

/// Admin commands. Non-admin callers get no reply at all.
async fn handle_admin(bot: &Bot, msg: &Message, cmd: &Command, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let Some(user_id) = caller_id(msg) else {
        return Ok(());
    };

    if let Some(reply) = handle_admin_command(&deps.store, &deps.config, user_id, cmd)? {
        bot.send_message(msg.chat.id, reply).await?;
    }
    Ok(())
}
