/// The bot driven through the JSON-lines console gateway
use super::*;
use serde_json::Value;

#[tokio::test]
async fn test_run_serves_gateway_until_eof() {
    let (bot, _db) = test_bot().await;

    let input = concat!(
        "{\"user_id\": 1, \"text\": \"Create habit\"}\n",
        "{\"user_id\": 1, \"text\": \"Drink water\"}\n",
        "not json\n",
        "{\"user_id\": 1, \"text\": \"yes\"}\n",
    );
    let mut gateway = ConsoleGateway::new(input.as_bytes(), Vec::new());

    bot.run(&mut gateway).await.expect("run failed");

    let output = String::from_utf8(gateway.into_writer()).unwrap();
    let lines: Vec<Value> = output.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 4);

    assert_eq!(lines[0]["user_id"], 1);
    assert_eq!(lines[0]["options"][0]["label"], "Cancel");
    assert!(lines[1]["text"].as_str().unwrap().contains("Drink water"));
    assert!(lines[2]["error"].is_string());
    assert!(lines[3]["text"].as_str().unwrap().contains("created"));

    let habits = bot.storage().list_habits(UserId(1)).await.unwrap();
    assert_eq!(habits.len(), 1);
}

#[tokio::test]
async fn test_habit_options_carry_tokens() {
    let (bot, _db) = test_bot().await;
    let habit_id = bot.storage().create_habit(UserId(3), "Yoga").await.unwrap();

    let input = "{\"user_id\": 3, \"text\": \"Statistics\"}\n";
    let mut gateway = ConsoleGateway::new(input.as_bytes(), Vec::new());
    bot.run(&mut gateway).await.unwrap();

    let output = String::from_utf8(gateway.into_writer()).unwrap();
    let line: Value = serde_json::from_str(output.trim()).unwrap();
    assert_eq!(line["options"][0]["label"], "Yoga");
    assert_eq!(line["options"][0]["id"], habit_id.token().as_str());
    assert!(line["options"][1].get("id").is_none());
}
