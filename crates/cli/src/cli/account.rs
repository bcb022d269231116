//! `tripchat login | register | logout | whoami`, also reachable as REPL
//! slash commands.

use rustyline::DefaultEditor;

use tc_client::{AppState, AuthPhase, Registration};
use tc_domain::notice::{Notice, NoticeLevel};

fn ask(rl: &mut DefaultEditor, prompt: &str) -> anyhow::Result<String> {
    Ok(rl.readline(prompt)?.trim().to_owned())
}

fn ask_secret(prompt: &str) -> anyhow::Result<String> {
    Ok(rpassword::prompt_password_stderr(prompt)?)
}

pub async fn login(app: &AppState, rl: &mut DefaultEditor) -> anyhow::Result<()> {
    let email = ask(rl, "email: ")?;
    let password = ask_secret("password: ")?;

    match app.auth.login(&email, &password).await {
        Ok(user) => {
            app.notifier.notify(Notice::new(
                NoticeLevel::Success,
                format!("Signed in as {}", user.name),
            ));
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("{e}")),
    }
}

pub async fn register(app: &AppState, rl: &mut DefaultEditor) -> anyhow::Result<()> {
    let form = Registration {
        email: ask(rl, "email: ")?,
        name: ask(rl, "name: ")?,
        username: ask(rl, "username: ")?,
        password: ask_secret("password: ")?,
        confirm_password: ask_secret("confirm password: ")?,
    };

    match app.auth.register(&form).await {
        Ok(user) => {
            app.notifier.notify(Notice::new(
                NoticeLevel::Success,
                format!("Welcome, {}! Your account is ready", user.name),
            ));
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("{e}")),
    }
}

pub fn logout(app: &AppState) {
    app.auth.logout();
    app.notifier
        .notify(Notice::new(NoticeLevel::Info, "Signed out"));
}

pub fn guest(app: &AppState) {
    let user = app.auth.guest_login();
    app.notifier.notify(Notice::new(
        NoticeLevel::Info,
        format!("Continuing as guest ({})", user.id),
    ));
}

pub fn whoami(app: &AppState) {
    match (app.auth.phase(), app.auth.user()) {
        (AuthPhase::Authenticated, Some(user)) => {
            println!("{} <{}> (id {})", user.name, user.email, user.id);
        }
        (AuthPhase::Guest, Some(user)) => println!("guest ({})", user.id),
        _ => println!("not signed in"),
    }
}
