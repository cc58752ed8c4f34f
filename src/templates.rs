/// Banner echoed at the start of every interactive session.
pub const WELCOME_ASCII: &str = include_str!("../assets/welcome.ascii");
