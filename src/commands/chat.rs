//! Ask the chat widget a question from the command line

use anyhow::Result;

use crate::chat::ChatResponder;
use crate::Folio;

/// Print the chat reply for `message`
pub async fn run(folio: &Folio, message: &str) -> Result<String> {
    let content = folio.site_content().await?;
    let responder = ChatResponder::from_content(&folio.config, &content);
    let reply = responder.respond(message);
    println!("{}", reply);
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_chat_uses_site_content() {
        let dir = tempfile::TempDir::new().unwrap();
        crate::commands::init::init_site(dir.path()).unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        let reply = run(&folio, "What skills do you have?").await.unwrap();
        assert_eq!(reply, "Skills: Rust, TypeScript, SQL.");

        let reply = run(&folio, "how do I contact you").await.unwrap();
        assert!(reply.contains("contact form"));
    }
}
