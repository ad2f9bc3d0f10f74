//! File upload handler

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use super::types::{caller_id, HandlerDeps, HandlerError};
use crate::storage::{FileKind, UploadOutcome};
use crate::telegram::messages;
use crate::telegram::Bot;

/// File reference and kind pulled out of an incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingUpload {
    pub file_ref: String,
    pub kind: FileKind,
}

/// Picks the file carried by a message: document, then video, then audio,
/// then the largest photo size.
pub fn extract_upload(msg: &Message) -> Option<IncomingUpload> {
    if let Some(doc) = msg.document() {
        return Some(IncomingUpload {
            file_ref: doc.file.id.0.clone(),
            kind: FileKind::Document,
        });
    }
    if let Some(video) = msg.video() {
        return Some(IncomingUpload {
            file_ref: video.file.id.0.clone(),
            kind: FileKind::Video,
        });
    }
    if let Some(audio) = msg.audio() {
        return Some(IncomingUpload {
            file_ref: audio.file.id.0.clone(),
            kind: FileKind::Audio,
        });
    }
    msg.photo()
        .and_then(|photos| photos.iter().max_by_key(|p| p.width * p.height))
        .map(|p| IncomingUpload {
            file_ref: p.file.id.0.clone(),
            kind: FileKind::Photo,
        })
}

/// Handler for messages carrying a document, photo, video or audio
pub(super) fn upload_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            msg.document().is_some() || msg.photo().is_some() || msg.video().is_some() || msg.audio().is_some()
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move { handle_upload(&bot, &msg, &deps).await }
        })
}

async fn handle_upload(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), HandlerError> {
    let chat_id = msg.chat.id;
    let user_id = caller_id(msg).unwrap_or(chat_id.0);

    let Some(upload) = extract_upload(msg) else {
        bot.send_message(chat_id, messages::UNSUPPORTED_FILE).await?;
        return Ok(());
    };

    match deps.store.try_register_upload(user_id, &upload.file_ref, upload.kind)? {
        UploadOutcome::Registered { code, entitlement } => {
            let link = messages::share_link(&deps.bot_username, &code);
            bot.send_message(chat_id, messages::upload_success_text(&link, &entitlement))
                .await?;
        }
        UploadOutcome::QuotaExceeded(entitlement) => {
            let upi = deps.store.upi_id()?;
            let username = deps.store.admin_username()?;
            let mut req = bot.send_message(chat_id, messages::quota_exceeded_text(&entitlement, &upi, &username));
            let label = format!("🚀 Buy Premium (Contact @{})", username);
            if let Some(keyboard) = messages::contact_keyboard(&label, &username) {
                req = req.reply_markup(keyboard);
            }
            req.await?;
        }
    }
    Ok(())
}
