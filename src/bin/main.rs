use finance_dialogue_router::{
    backend::MockBackend, router::DialogueRouter, state::ConversationState,
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("Finance Dialogue Router demo starting");

    // Scripted backend: the first reply is consumed by a keyword-overridden
    // turn, the second answers the open-ended question.
    let backend = MockBackend::with_replies([
        "A 50/30/20 split is a solid starting point.",
        "Index funds provide **diversification** and low fees.",
    ]);
    let probe = backend.clone();

    let mut router = DialogueRouter::new(Box::new(backend), ConversationState::new());
    router.prime().await?;

    info!("Router primed - running sample turns");

    for utterance in [
        "Hello, can you help?",
        "yes",
        "How should I plan my monthly budget?",
        "What's a good first step into the stock market?",
    ] {
        let response = router.handle_turn(utterance).await?;
        println!("You: {}", utterance);
        println!("Finbot: {}\n", response);
    }

    println!("=== TRANSCRIPT ===");
    print!("{}", router.state().formatted_transcript());
    println!("Backend completions requested: {}", probe.sent_count().await);

    Ok(())
}
