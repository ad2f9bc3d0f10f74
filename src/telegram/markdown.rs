//! MarkdownV2 helpers

use teloxide::payloads::SendMessage;
use teloxide::prelude::*;
use teloxide::requests::JsonRequest;
use teloxide::types::{InlineKeyboardMarkup, ParseMode};
use teloxide::{ApiError, RequestError};

/// Escapes special characters for MarkdownV2 format
pub fn escape_markdown_v2(text: &str) -> String {
    let mut result = String::with_capacity(text.len() * 2);

    for c in text.chars() {
        match c {
            '\\' | '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|' | '{' | '}'
            | '.' | '!' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// True when Telegram rejected the text over its MarkdownV2 entities
pub fn is_markdown_parse_error(err: &RequestError) -> bool {
    match err {
        RequestError::Api(ApiError::CantParseEntities(_)) => true,
        RequestError::Api(ApiError::Unknown(text)) => text.to_lowercase().contains("can't parse entities"),
        _ => false,
    }
}

fn markdown_request(
    bot: &Bot,
    chat_id: ChatId,
    text: String,
    keyboard: Option<&InlineKeyboardMarkup>,
) -> JsonRequest<SendMessage> {
    let req = bot.send_message(chat_id, text).parse_mode(ParseMode::MarkdownV2);
    match keyboard {
        Some(kb) => req.reply_markup(kb.clone()),
        None => req,
    }
}

/// Sends `text` as MarkdownV2. Reply texts interpolate user-controlled
/// values, so an entity error is answered once with the fully escaped text.
pub async fn send_message_markdown_v2(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    keyboard: Option<InlineKeyboardMarkup>,
) -> ResponseResult<Message> {
    let text = text.into();
    match markdown_request(bot, chat_id, text.clone(), keyboard.as_ref()).await {
        Err(e) if is_markdown_parse_error(&e) => {
            log::warn!("MarkdownV2 rejected for chat {}, resending escaped: {}", chat_id, e);
            markdown_request(bot, chat_id, escape_markdown_v2(&text), keyboard.as_ref()).await
        }
        sent => sent,
    }
}
