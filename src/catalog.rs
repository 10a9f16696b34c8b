//! Content catalog: every screen's English text and button layout.
//!
//! Built once at startup and shared read-only. Translation happens at render
//! time; nothing here is localized.

use std::fmt;
use zanbot_core::language::Language;
use zanbot_core::message::ButtonAction;

pub const WEBSITE_URL: &str = "https://zancoinmint.com";
pub const SUPPORT_URL: &str = "mailto:support@zancoinmint.com";
pub const REGISTER_URL: &str = "https://zancoinmint.com/panel/dist/auth-register.php";
pub const LOGIN_URL: &str = "https://zancoinmint.com/panel/dist/auth-login.html";
const SHARE_MESSAGE: &str = "I joined ZanCoin! Create your ZanCoin now: https://zancoinmint.com";

/// Main menu text shown by `/start` and after a language change.
pub const WELCOME_TEXT: &str = "\u{1f44b} Welcome! Please choose an option below:";
/// Main menu text shown when navigating back from another screen.
pub const RETURN_TEXT: &str = "What would you like to do next?";
/// Generic apology sent when handling an event fails.
pub const ERROR_TEXT: &str = "\u{26a0}\u{fe0f} An error occurred. Please try again later.";

const WHAT_IS_TEXT: &str = "Choose an option below:";
const EXPLAIN_TEXT: &str = "\u{1f539} IN SUMMARY:\n\n\
    Zan Coin is the first crypto project aiming to create coins with unique identity numbers, \
    similar to banknotes and NFTs. The presale has started.\n\n\
    When you send USDT to create Zan Coin, our system generates two unique IDs and assigns them to you. \
    You receive 1 ZanCoin immediately. To get the second one, click the WhatsApp share button. \
    After both are activated, ZC Network Marketing and ZC Game become available in your profile.";
const NETWORK_TEXT: &str = "\u{1f4bc} ZC Network Marketing\n\n\
    To move our project to the next step, we aim to reach 25,000 members. \
    Instead of spending our marketing budget on ads, we give it to you!\n\n\
    In the Network Marketing section, you\u{2019}ll find your unique referral link. \
    For every user who registers and creates a Zan Coin through your link, you earn $25 instantly.";
const GAME_TEXT: &str = "\u{1f3ae} ZC Game\n\n\
    Compete with other users to achieve the highest score and win $500. \
    The game resets every ~2\u{2013}3 weeks at a random time. The user at the top when it resets wins the reward.\n\n\
    If you win, we\u{2019}ll email your registered address and request a wallet number to send your reward.";
const EARN_TEXT: &str = "\u{1f4b0} HOW CAN I EARN?\n\n\
    You can sell your Zan Coins once they are listed on crypto exchanges. \
    Additionally, you can earn instantly through ZC Network Marketing and ZC Game, and withdraw your money.";
const REGISTER_TEXT: &str = "\u{1f310} Redirecting to registration page...";
const LOGIN_TEXT: &str = "\u{1f510} Redirecting to login page...";
const LANGUAGE_TEXT: &str = "Please choose your language:";

/// Toast shown after a language change.
pub fn language_set_text(lang: Language) -> String {
    format!("\u{2705} Language set to {lang}. Returning to main menu...")
}

/// Every navigable screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreenId {
    MainMenu,
    WhatIs,
    Explain,
    Network,
    Game,
    Earn,
    Register,
    Login,
    LanguageSelect,
}

impl ScreenId {
    pub const ALL: [ScreenId; 9] = [
        ScreenId::MainMenu,
        ScreenId::WhatIs,
        ScreenId::Explain,
        ScreenId::Network,
        ScreenId::Game,
        ScreenId::Earn,
        ScreenId::Register,
        ScreenId::Login,
        ScreenId::LanguageSelect,
    ];

    /// Stable identifier used in logs and the CLI.
    pub fn id(&self) -> &'static str {
        match self {
            Self::MainMenu => "main_menu",
            Self::WhatIs => "what_is",
            Self::Explain => "explain",
            Self::Network => "network",
            Self::Game => "game",
            Self::Earn => "earn",
            Self::Register => "register",
            Self::Login => "login",
            Self::LanguageSelect => "language_select",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// A base-language button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: ButtonAction,
}

impl Button {
    /// A button that sends `trigger` back as a callback.
    pub fn nav(label: &str, trigger: &str) -> Self {
        Self {
            label: label.to_string(),
            action: ButtonAction::Callback(trigger.to_string()),
        }
    }

    /// A button that opens `url`.
    pub fn link(label: &str, url: &str) -> Self {
        Self {
            label: label.to_string(),
            action: ButtonAction::Url(url.to_string()),
        }
    }
}

/// One screen: body text and ordered button rows.
#[derive(Debug, Clone)]
pub struct Screen {
    pub id: ScreenId,
    pub text: &'static str,
    pub rows: Vec<Vec<Button>>,
}

/// The full screen table.
#[derive(Debug, Clone)]
pub struct Catalog {
    screens: Vec<Screen>,
}

impl Catalog {
    /// Build the ZanCoin menu.
    pub fn zancoin() -> Self {
        let screens = ScreenId::ALL
            .into_iter()
            .map(|id| Screen {
                id,
                text: body_text(id),
                rows: layout(id),
            })
            .collect();
        Self { screens }
    }

    pub fn screen(&self, id: ScreenId) -> &Screen {
        &self.screens[id.index()]
    }

    pub fn screens(&self) -> impl Iterator<Item = &Screen> {
        self.screens.iter()
    }
}

fn body_text(id: ScreenId) -> &'static str {
    match id {
        ScreenId::MainMenu => WELCOME_TEXT,
        ScreenId::WhatIs => WHAT_IS_TEXT,
        ScreenId::Explain => EXPLAIN_TEXT,
        ScreenId::Network => NETWORK_TEXT,
        ScreenId::Game => GAME_TEXT,
        ScreenId::Earn => EARN_TEXT,
        ScreenId::Register => REGISTER_TEXT,
        ScreenId::Login => LOGIN_TEXT,
        ScreenId::LanguageSelect => LANGUAGE_TEXT,
    }
}

fn back_main() -> Vec<Button> {
    vec![Button::nav("Back", "back_main")]
}

fn layout(id: ScreenId) -> Vec<Vec<Button>> {
    match id {
        ScreenId::MainMenu => vec![
            vec![
                Button::nav("Register", "register"),
                Button::nav("Login", "login"),
            ],
            vec![Button::nav("What is ZanCoin?", "what_is")],
            vec![Button::nav("How can I earn?", "earn")],
            vec![Button::link("Support Email", SUPPORT_URL)],
            vec![Button::nav("Change Language", "change_lang")],
        ],
        ScreenId::WhatIs => vec![
            vec![Button::link("Visit Website", WEBSITE_URL)],
            vec![Button::nav("Tell me about it", "explain")],
            back_main(),
        ],
        ScreenId::Explain => vec![
            vec![
                Button::nav("ZC Network Marketing", "network"),
                Button::nav("ZC Game", "game"),
            ],
            vec![Button::link("Share on WhatsApp", &whatsapp_share_url())],
            vec![
                Button::nav("Register", "register"),
                Button::nav("Login", "login"),
            ],
            back_main(),
        ],
        ScreenId::Network => vec![
            vec![Button::nav("Learn about ZC Game", "game")],
            vec![Button::nav("Back", "explain")],
        ],
        ScreenId::Game => vec![vec![Button::nav("Back", "explain")]],
        ScreenId::Earn => vec![back_main()],
        ScreenId::Register => vec![
            vec![Button::link("Go to Registration", REGISTER_URL)],
            back_main(),
        ],
        ScreenId::Login => vec![vec![Button::link("Go to Login", LOGIN_URL)], back_main()],
        ScreenId::LanguageSelect => language_rows(),
    }
}

/// Two languages per row, native names, then a Back row.
fn language_rows() -> Vec<Vec<Button>> {
    let mut rows: Vec<Vec<Button>> = Language::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|l| Button::nav(l.native_name(), &format!("setlang_{}", l.code())))
                .collect()
        })
        .collect();
    rows.push(back_main());
    rows
}

/// WhatsApp share intent pre-filled with the invitation message.
pub fn whatsapp_share_url() -> String {
    format!("https://wa.me/?text={}", urlencoding::encode(SHARE_MESSAGE))
}
