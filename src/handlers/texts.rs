use teloxide::utils::command::BotCommands;
use teloxide::utils::html::escape;
use url::Url;

use crate::commands::Command;
use crate::handlers::broadcast::BroadcastReport;
use crate::model::{AggregateStats, UserRecord};
use crate::registry::UserRegistry;

pub const USERS_PER_PAGE: usize = 10;

pub const NOT_ADMIN: &str = "❌ You do not have administrator rights.";
pub const ACCESS_DENIED: &str = "❌ Access denied";
pub const SETWEBAPP_USAGE: &str = "❌ Usage: /setwebapp <url>";
pub const URL_PROMPT: &str = "🔗 <b>Set the app URL</b>\n\n\
    Send the new mini-app URL (it must start with https://).\n\
    /cancel to abort.";
pub const BROADCAST_PROMPT: &str = "📢 <b>Broadcast</b>\n\n\
    Send the message that should go out to every user.\n\
    /cancel to abort.";
pub const BROADCAST_FALLBACK: &str = "📢 Message from the administrator";
pub const BROADCAST_STARTING: &str = "📤 Starting broadcast...";
pub const CANCELLED: &str = "❌ Cancelled.";
pub const NOTHING_TO_CANCEL: &str = "Nothing to cancel.";
pub const FALLBACK_GREETING: &str = "👋 Hi! Use /start to begin or press a button below:";
pub const STATS_UNAVAILABLE: &str = "📈 Stats are not available.";
pub const URL_NOT_TEXT: &str = "❌ Please send the URL as a text message.";

pub fn welcome_text(name: &str) -> String {
    format!(
        "🎓 <b>Welcome, {}!</b>\n\n\
         I am the companion bot for the <b>school year results</b> mini-app.\n\n\
         📚 With the app you can:\n\
         • Track your grades for each subject\n\
         • See your performance statistics\n\
         • Earn achievements for good results\n\
         • Follow your progress\n\n\
         🚀 <b>Press the button below to open the app!</b>\n\n\
         💡 Use /help to get help",
        escape(name)
    )
}

pub fn help_text() -> String {
    format!(
        "ℹ️ <b>How to use the bot</b>\n\n\
         <b>Commands:</b>\n{}\n\n\
         <b>Getting started:</b>\n\
         1. Press \"📊 Open app\"\n\
         2. Add your subjects and grades\n\
         3. Watch your progress\n\
         4. Collect achievements!\n\n\
         If you have questions, write to an administrator.",
        escape(&Command::descriptions().to_string())
    )
}

pub fn menu_help_text() -> &'static str {
    "ℹ️ <b>Help</b>\n\n\
     Press \"📊 Open app\" to work with the mini-app.\n\n\
     <b>Main features:</b>\n\
     • Subjects and grades\n\
     • Statistics\n\
     • Achievements"
}

pub fn personal_stats_text(record: Option<&UserRecord>) -> String {
    match record {
        Some(user) => format!(
            "📈 <b>Your stats:</b>\n\n\
             👤 Name: {}\n\
             📅 Joined: {}\n\
             💬 Messages sent: {}",
            escape(&user.first_name),
            user.joined_at.format("%Y-%m-%d"),
            user.messages_count
        ),
        None => STATS_UNAVAILABLE.to_string(),
    }
}

pub fn admin_panel_text() -> &'static str {
    "⚙️ <b>Admin panel</b>\n\nChoose an action:"
}

pub fn admin_stats_text(stats: &AggregateStats, active_users: usize, webapp_url: &Url) -> String {
    format!(
        "📊 <b>Bot stats:</b>\n\n\
         👥 Total users: {}\n\
         🟢 Active users: {}\n\
         💬 Total messages: {}\n\
         📅 Running since: {}\n\
         🔗 App URL: {}",
        stats.total_users,
        active_users,
        stats.messages_sent,
        stats.start_date.format("%Y-%m-%d"),
        escape(webapp_url.as_str())
    )
}

pub fn users_list_text(registry: &UserRegistry) -> String {
    let (recent, remaining) = registry.recent(USERS_PER_PAGE);
    let mut text = String::from("👥 <b>Bot users:</b>\n\n");

    for (_, user) in &recent {
        let handle = match &user.username {
            Some(username) => format!(" (@{})", escape(username)),
            None => String::new(),
        };
        text.push_str(&format!(
            "• {}{} - {} messages\n",
            escape(&user.first_name),
            handle,
            user.messages_count
        ));
    }

    if remaining > 0 {
        text.push_str(&format!("\n... and {} more users", remaining));
    }

    text
}

pub fn settings_text(webapp_url: &Url, admin_count: usize, total_users: u64) -> String {
    format!(
        "⚙️ <b>Bot settings</b>\n\n\
         🔗 App URL: {}\n\
         👤 Administrators: {}\n\
         📊 Total users: {}\n\n\
         <b>Commands:</b>\n\
         /admin - Admin panel\n\
         /setwebapp &lt;url&gt; - Set the app URL (shortcut)\n\
         /cancel - Leave the current flow",
        escape(webapp_url.as_str()),
        admin_count,
        total_users
    )
}

pub fn url_rejected_text() -> &'static str {
    "❌ The URL must start with https://"
}

pub fn url_updated_text(url: &Url) -> String {
    format!(
        "✅ App URL updated!\n\nNew URL: {}\n\nUse /admin to return to the admin panel.",
        url
    )
}

pub fn url_set_text(url: &Url) -> String {
    format!("✅ App URL updated: {}", url)
}

pub fn broadcast_report_text(report: &BroadcastReport) -> String {
    format!(
        "✅ Broadcast completed!\n\n✅ Delivered: {}\n❌ Failed: {}",
        report.delivered, report.failed
    )
}
