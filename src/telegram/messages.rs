//! Reply texts and keyboards
//!
//! Pure rendering from store results; no I/O. Functions whose names end in
//! `_markdown` return MarkdownV2, everything else is plain text.

use chrono::{DateTime, Utc};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::markdown::escape_markdown_v2;
use crate::storage::{Entitlement, StoreStats};

/// Token replaced with the payment identifier in plan text
pub const UPI_TOKEN: &str = "{upi}";
/// Token replaced with the admin handle (no `@`) in plan text
pub const USERNAME_TOKEN: &str = "{username}";

pub const FILE_NOT_FOUND: &str = "❌ File not found.";
pub const UNSUPPORTED_FILE: &str = "❌ Unsupported file type.";

/// Default plan announcement used until an admin sets `plans_text`
pub const DEFAULT_PLANS_TEMPLATE: &str = "✨ Premium Subscription Plans ✨\n\n\
    1️⃣ 1 Month: ₹XX\n\
    2️⃣ 3 Months: ₹XX\n\
    3️⃣ 6 Months: ₹XX\n\
    4️⃣ 1 Year: ₹XX\n\n\
    🚀 Benefits:\n\
    ✅ Unlimited File Links\n\
    ✅ No Daily Limits\n\n\
    📱 UPI ID: {upi}\n\
    👤 Admin: @{username}\n\n\
    📩 Send screenshot to Admin to activate!";

/// Deep link that hands `code` back to the bot as the /start payload
pub fn share_link(bot_username: &str, code: &str) -> String {
    format!("https://t.me/{}?start={}", bot_username, code)
}

/// Substitutes the plan tokens
pub fn render_plan_text(template: &str, upi: &str, username: &str) -> String {
    template.replace(UPI_TOKEN, upi).replace(USERNAME_TOKEN, username)
}

/// Inline keyboard with one URL button to the admin's chat.
/// None when the handle does not form a valid URL.
pub fn contact_keyboard(label: &str, username: &str) -> Option<InlineKeyboardMarkup> {
    let url = url::Url::parse(&format!("https://t.me/{}", username)).ok()?;
    Some(InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::url(
        label.to_string(),
        url,
    )]]))
}

pub fn help_markdown() -> String {
    let steps = escape_markdown_v2(
        "1. Send any file (photo, video, audio, or document) to the bot.\n\
         2. The bot will generate a unique shareable link for you.\n\
         3. Share that link with anyone! When they click it and start the bot, they get the file.",
    );
    let commands = escape_markdown_v2(
        "/start - Start the bot & check status\n\
         /help - Show this help message\n\
         /status - Check your plan and remaining credits\n\
         /plan - View premium subscription plans\n\
         /myid - Get your Telegram User ID",
    );
    format!(
        "📖 *How to use this Bot*\n{}\n\n🛠 *Commands:*\n{}",
        steps, commands
    )
}

/// One-line plan summary used in the welcome message
pub fn status_line(entitlement: &Entitlement) -> String {
    if entitlement.premium {
        "⭐ Premium".to_string()
    } else {
        format!(
            "🆓 Free ({}/{} credits left)",
            entitlement.remaining(),
            entitlement.limit
        )
    }
}

pub fn welcome_text(entitlement: &Entitlement) -> String {
    format!(
        "📂 Send me any file.\n🔗 I will give you a shareable link.\n\n\
         Status: {}\n\
         ✨ Premium users get unlimited links!\n\
         Use /help to learn how to use the bot.",
        status_line(entitlement)
    )
}

fn format_expiry(expires_at: Option<DateTime<Utc>>) -> String {
    match expires_at {
        Some(ts) => ts.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => "Lifetime".to_string(),
    }
}

pub fn status_markdown(entitlement: &Entitlement) -> String {
    if entitlement.premium {
        format!(
            "🌟 *Premium Status: Active*\n📅 Expiry: `{}`",
            format_expiry(entitlement.expires_at)
        )
    } else {
        format!(
            "🆓 *Plan: Free*\n📊 Credits: `{}/{} left today`",
            entitlement.remaining(),
            entitlement.limit
        )
    }
}

pub fn my_id_markdown(user_id: i64) -> String {
    format!("🆔 Your User ID: `{}`", user_id)
}

pub fn quota_exceeded_text(entitlement: &Entitlement, upi: &str, username: &str) -> String {
    format!(
        "❌ Your credits are expired (used {}/{}).\n\n\
         💰 To get unlimited links, buy Premium!\n\
         Use /plan to see our subscription plans.\n\
         📱 UPI: {}\n\
         👤 Admin: @{}\n\
         📩 Send screenshot to Admin below.",
        entitlement.used, entitlement.limit, upi, username
    )
}

pub fn upload_success_text(link: &str, entitlement: &Entitlement) -> String {
    let credits = if entitlement.premium {
        "⭐ Premium User (Unlimited)".to_string()
    } else {
        format!("📊 Credits: {}/{} used.", entitlement.used, entitlement.limit)
    };
    format!("✅ File uploaded!\n\n🔗 Share link:\n{}\n\n{}", link, credits)
}

pub fn premium_granted_text(user_id: i64, months: i64, expires_at: DateTime<Utc>) -> String {
    format!(
        "✅ User {} is now Premium for {} months!\n📅 Expiry: {}",
        user_id,
        months,
        expires_at.format("%Y-%m-%d")
    )
}

pub fn stats_text(stats: &StoreStats) -> String {
    format!(
        "📈 Bot statistics\n\n\
         📁 Files total: {}\n\
         🗓 Files today (UTC): {}\n\
         ⭐ Active premium users: {}",
        stats.total_files, stats.files_today, stats.active_premium
    )
}
