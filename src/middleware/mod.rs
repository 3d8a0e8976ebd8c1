pub mod wx_auth;
