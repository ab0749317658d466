use duelbench_ai::policy::{fallback_action, validate};
use duelbench_ai::{Agent, AgentError, create_agent};
use duelbench_engine::deck::SeedStream;
use duelbench_engine::engine::Engine;
use duelbench_engine::game::GameConfig;

async fn play(agent: &dyn Agent, seed: u64) -> Vec<String> {
    let mut hand = Engine::from_seed("t-0A", GameConfig::default(), seed).unwrap();
    let mut log = Vec::new();
    while !hand.is_complete() {
        let obs = hand.observation().unwrap();
        let reply = agent.decide(&obs).await.unwrap();
        let action = validate(&obs, &reply).unwrap_or_else(|_| fallback_action(&obs));
        log.push(format!("{action:?}"));
        hand.apply(action).unwrap();
    }
    log
}

#[tokio::test]
async fn random_agent_replays_with_same_seed() {
    let mut seeds = SeedStream::new(3);
    for _ in 0..20 {
        let seed = seeds.next_seed();
        let a = create_agent("random", 99).unwrap();
        let b = create_agent("random", 99).unwrap();
        assert_eq!(play(a.as_ref(), seed).await, play(b.as_ref(), seed).await);
    }
}

#[tokio::test]
async fn random_agent_replies_are_always_valid() {
    let agent = create_agent("random", 5).unwrap();
    let mut seeds = SeedStream::new(8);
    for _ in 0..100 {
        let mut hand = Engine::from_seed("t-1A", GameConfig::default(), seeds.next_seed()).unwrap();
        while !hand.is_complete() {
            let obs = hand.observation().unwrap();
            let reply = agent.decide(&obs).await.unwrap();
            let action = validate(&obs, &reply).expect("random agent stays inside the legal set");
            hand.apply(action).unwrap();
        }
    }
}

#[test]
fn unknown_agent_kind_is_an_error() {
    assert_eq!(
        create_agent("gpt", 0).err(),
        Some(AgentError::UnknownAgent("gpt".into()))
    );
}
