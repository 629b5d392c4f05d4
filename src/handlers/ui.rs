use strum::{EnumIter, EnumString, IntoStaticStr};
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, WebAppInfo};
use url::Url;

pub const BTN_OPEN_APP: &str = "📊 Open app";
pub const BTN_HELP: &str = "ℹ️ Help";
pub const BTN_STATS: &str = "📈 Stats";
pub const BTN_ADMIN_PANEL: &str = "⚙️ Admin panel";
pub const BTN_BOT_STATS: &str = "📊 Bot stats";
pub const BTN_USERS: &str = "👥 Users";
pub const BTN_BROADCAST: &str = "📢 Broadcast";
pub const BTN_SET_URL: &str = "🔗 Set app URL";
pub const BTN_SETTINGS: &str = "⚙️ Settings";
pub const BTN_HOME: &str = "🏠 Home";

/// Callback data carried by inline buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumString, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum MenuAction {
    Home,
    Stats,
    Help,
    AdminPanel,
    AdminStats,
    AdminUsers,
    #[strum(serialize = "admin_seturl")]
    AdminSetUrl,
    AdminBroadcast,
    AdminSettings,
}

impl MenuAction {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

fn button(label: &str, action: MenuAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.as_str())
}

pub fn main_menu(webapp_url: &Url, is_admin: bool) -> InlineKeyboardMarkup {
    let mut rows = vec![
        vec![InlineKeyboardButton::web_app(
            BTN_OPEN_APP,
            WebAppInfo {
                url: webapp_url.clone(),
            },
        )],
        vec![button(BTN_HELP, MenuAction::Help), button(BTN_STATS, MenuAction::Stats)],
    ];

    if is_admin {
        rows.push(vec![button(BTN_ADMIN_PANEL, MenuAction::AdminPanel)]);
    }

    InlineKeyboardMarkup::new(rows)
}

pub fn admin_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            button(BTN_BOT_STATS, MenuAction::AdminStats),
            button(BTN_USERS, MenuAction::AdminUsers),
        ],
        vec![
            button(BTN_BROADCAST, MenuAction::AdminBroadcast),
            button(BTN_SET_URL, MenuAction::AdminSetUrl),
        ],
        vec![button(BTN_SETTINGS, MenuAction::AdminSettings)],
        vec![button(BTN_HOME, MenuAction::Home)],
    ])
}

pub fn home_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![button(BTN_HOME, MenuAction::Home)]])
}
