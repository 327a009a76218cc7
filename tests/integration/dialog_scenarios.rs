/// End-to-end dialog scenarios
use super::*;
use habit_tracker_bot::session::{CompleteStep, CreateStep, DeleteStep, StatsStep};

const MAIN_MENU: [&str; 4] = ["Create habit", "Complete habit", "Statistics", "Delete habit"];

async fn create_habit(bot: &HabitTrackerBot, user: i64, name: &str) -> HabitId {
    say(bot, user, "Create habit").await;
    say(bot, user, name).await;
    let reply = say(bot, user, "Yes").await;
    assert!(reply.text.contains("created"), "unexpected reply: {}", reply.text);

    let habits = bot.storage().list_habits(UserId(user)).await.unwrap();
    habits.last().expect("habit was not stored").id
}

async fn complete_habit(bot: &HabitTrackerBot, user: i64, habit_id: HabitId, count: &str) -> Reply {
    say(bot, user, "Complete habit").await;
    say(bot, user, &habit_id.token()).await;
    say(bot, user, count).await;
    say(bot, user, "yes").await
}

#[tokio::test]
async fn test_create_habit_end_to_end() {
    let (bot, _db) = test_bot().await;

    let reply = say(&bot, 1, "create habit").await;
    assert!(reply.text.contains("Enter a name"));
    assert_eq!(state_of(&bot, 1).await, Some(DialogState::Create(CreateStep::AwaitingName)));

    let reply = say(&bot, 1, "  Drink water ").await;
    assert!(reply.text.contains("Name: Drink water"));
    assert_eq!(reply.option_labels(), vec!["Yes", "No", "Cancel"]);

    let reply = say(&bot, 1, "да").await;
    assert!(reply.text.contains("\"Drink water\" created"));
    assert_eq!(reply.option_labels(), MAIN_MENU.to_vec());
    assert_eq!(state_of(&bot, 1).await, None);

    let habits = bot.storage().list_habits(UserId(1)).await.unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].name, "Drink water");
}

#[tokio::test]
async fn test_complete_without_habits_never_starts() {
    let (bot, _db) = test_bot().await;

    let reply = say(&bot, 1, "complete habit").await;
    assert!(reply.text.contains("no habits"));
    assert_eq!(state_of(&bot, 1).await, None);
}

#[tokio::test]
async fn test_completions_add_up_for_today() {
    let (bot, _db) = test_bot().await;
    let habit_id = create_habit(&bot, 1, "Push-ups").await;

    let reply = complete_habit(&bot, 1, habit_id, "5").await;
    assert!(reply.text.contains("marked done 5 time(s)"));
    assert!(reply.text.contains("Total completions: 5"));

    let reply = complete_habit(&bot, 1, habit_id, "3").await;
    assert!(reply.text.contains("Total completions: 8"));

    let today = bot.storage().get_statistics(habit_id, Period::Today).await.unwrap();
    assert_eq!(today, 8);
}

#[tokio::test]
async fn test_count_validation_reprompts() {
    let (bot, _db) = test_bot().await;
    let habit_id = create_habit(&bot, 1, "Squats").await;

    say(&bot, 1, "Complete habit").await;
    let reply = say(&bot, 1, "Squats").await;
    assert!(reply.text.contains("Selected habit: Squats"));

    for bad in ["abc", "0", "-3", "101", "2.5"] {
        let reply = say(&bot, 1, bad).await;
        assert_eq!(reply.option_labels(), vec!["Cancel"], "input {}", bad);
        assert_eq!(
            state_of(&bot, 1).await,
            Some(DialogState::Complete(CompleteStep::AwaitingCount)),
            "input {}",
            bad
        );
    }

    let reply = say(&bot, 1, "100").await;
    assert!(reply.text.contains("Repetitions: 100"));

    // Unrecognized confirmation keeps the step
    let reply = say(&bot, 1, "perhaps").await;
    assert!(reply.text.contains("Yes to record"));
    assert_eq!(
        state_of(&bot, 1).await,
        Some(DialogState::Complete(CompleteStep::AwaitingConfirmation))
    );

    let reply = say(&bot, 1, "no").await;
    assert!(reply.text.contains("not recorded"));
    assert_eq!(bot.storage().get_statistics(habit_id, Period::Year).await.unwrap(), 0);
}

#[tokio::test]
async fn test_cancel_returns_to_idle() {
    let (bot, _db) = test_bot().await;
    create_habit(&bot, 1, "Meditate").await;

    say(&bot, 1, "Complete habit").await;
    say(&bot, 1, "Meditate").await;
    assert!(state_of(&bot, 1).await.is_some());

    let reply = say(&bot, 1, "cancel").await;
    assert_eq!(reply.text, "Action cancelled.");
    assert_eq!(state_of(&bot, 1).await, None);

    // "7" would have been a valid count; now it is just idle chatter
    let reply = say(&bot, 1, "7").await;
    assert!(reply.text.contains("menu buttons"));
    assert_eq!(state_of(&bot, 1).await, None);
}

#[tokio::test]
async fn test_menu_trigger_replaces_active_flow() {
    let (bot, _db) = test_bot().await;
    create_habit(&bot, 1, "Journal").await;

    say(&bot, 1, "Create habit").await;
    let reply = say(&bot, 1, "Statistics").await;
    assert!(reply.text.contains("statistics"));
    assert_eq!(
        state_of(&bot, 1).await,
        Some(DialogState::Stats(StatsStep::AwaitingHabitChoice))
    );
}

#[tokio::test]
async fn test_delete_habit_flow() {
    let (bot, _db) = test_bot().await;
    let habit_id = create_habit(&bot, 1, "Smoke less").await;
    complete_habit(&bot, 1, habit_id, "2").await;

    say(&bot, 1, "Delete habit").await;
    let reply = say(&bot, 1, "Smoke less").await;
    assert!(reply.text.contains("Completed: 2 time(s)"));
    assert_eq!(
        state_of(&bot, 1).await,
        Some(DialogState::Delete(DeleteStep::AwaitingConfirmation))
    );

    let reply = say(&bot, 1, "YES").await;
    assert!(reply.text.contains("deleted"));

    assert!(bot.storage().list_habits(UserId(1)).await.unwrap().is_empty());
    assert!(bot.storage().completion_times(habit_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_habit_choice_reprompts_with_list() {
    let (bot, _db) = test_bot().await;
    create_habit(&bot, 1, "Walk").await;

    say(&bot, 1, "Delete habit").await;
    let reply = say(&bot, 1, "Fly").await;
    assert!(reply.text.contains("Habit not found"));
    assert_eq!(reply.option_labels(), vec!["Walk", "Cancel"]);
    assert_eq!(
        state_of(&bot, 1).await,
        Some(DialogState::Delete(DeleteStep::AwaitingHabitChoice))
    );
}

#[tokio::test]
async fn test_stale_selection_clears_session() {
    let (bot, _db) = test_bot().await;
    let habit_id = create_habit(&bot, 1, "Floss").await;

    say(&bot, 1, "Complete habit").await;
    say(&bot, 1, "Floss").await;
    say(&bot, 1, "1").await;

    // Habit vanishes between selection and commit
    assert!(bot.storage().delete_habit(habit_id, UserId(1)).await.unwrap());

    let reply = say(&bot, 1, "yes").await;
    assert!(reply.text.contains("no longer exists"));
    assert_eq!(state_of(&bot, 1).await, None);
}

#[tokio::test]
async fn test_duplicate_names_are_all_selectable() {
    let (bot, _db) = test_bot().await;
    let first = create_habit(&bot, 1, "Read").await;
    let second = create_habit(&bot, 1, "Read").await;

    let reply = say(&bot, 1, "Complete habit").await;
    let second_label = format!("Read (#{})", second);
    assert_eq!(
        reply.option_labels(),
        vec![format!("Read (#{})", first).as_str(), second_label.as_str(), "Cancel"]
    );

    say(&bot, 1, &second_label).await;
    say(&bot, 1, "4").await;
    say(&bot, 1, "ok").await;

    assert_eq!(bot.storage().get_statistics(first, Period::Today).await.unwrap(), 0);
    assert_eq!(bot.storage().get_statistics(second, Period::Today).await.unwrap(), 4);
}

#[tokio::test]
async fn test_statistics_flow_reports_period_and_streak() {
    let (bot, _db) = test_bot().await;
    let habit_id = create_habit(&bot, 1, "Stretch").await;
    complete_habit(&bot, 1, habit_id, "3").await;

    say(&bot, 1, "Statistics").await;
    let reply = say(&bot, 1, "Stretch").await;
    assert_eq!(reply.option_labels(), vec!["Today", "Week", "Month", "Year", "Cancel"]);

    let reply = say(&bot, 1, "fortnight").await;
    assert!(reply.text.contains("Unknown period"));
    assert_eq!(state_of(&bot, 1).await, Some(DialogState::Stats(StatsStep::AwaitingPeriod)));

    let reply = say(&bot, 1, "Week").await;
    assert!(reply.text.contains("Completions this week: 3"));
    assert!(reply.text.contains("Total completions: 3"));
    assert!(reply.text.contains("Current streak: 1 day(s)"));
    assert_eq!(state_of(&bot, 1).await, None);
}

#[tokio::test]
async fn test_users_do_not_see_each_other() {
    let (bot, _db) = test_bot().await;
    create_habit(&bot, 1, "Mine").await;

    let reply = say(&bot, 2, "Delete habit").await;
    assert!(reply.text.contains("no habits"));

    say(&bot, 2, "Create habit").await;
    assert_eq!(state_of(&bot, 1).await, None);
    assert!(state_of(&bot, 2).await.is_some());
}

#[tokio::test]
async fn test_cancel_from_every_step_returns_to_idle() {
    let (bot, _db) = test_bot().await;
    let habit_id = create_habit(&bot, 1, "Read").await;

    let paths: [(&[&str], DialogState); 9] = [
        (&["Create habit"][..], DialogState::Create(CreateStep::AwaitingName)),
        (&["Create habit", "Swim"][..], DialogState::Create(CreateStep::AwaitingConfirmation)),
        (&["Delete habit"][..], DialogState::Delete(DeleteStep::AwaitingHabitChoice)),
        (&["Delete habit", "Read"][..], DialogState::Delete(DeleteStep::AwaitingConfirmation)),
        (&["Complete habit"][..], DialogState::Complete(CompleteStep::AwaitingHabitChoice)),
        (&["Complete habit", "Read"][..], DialogState::Complete(CompleteStep::AwaitingCount)),
        (&["Complete habit", "Read", "7"][..], DialogState::Complete(CompleteStep::AwaitingConfirmation)),
        (&["Statistics"][..], DialogState::Stats(StatsStep::AwaitingHabitChoice)),
        (&["Statistics", "Read"][..], DialogState::Stats(StatsStep::AwaitingPeriod)),
    ];

    for (inputs, expected) in paths {
        for text in inputs {
            say(&bot, 1, text).await;
        }
        assert_eq!(state_of(&bot, 1).await, Some(expected));

        let reply = say(&bot, 1, "Cancel").await;
        assert_eq!(reply.text, "Action cancelled.", "from {}", expected);
        assert_eq!(reply.option_labels(), MAIN_MENU.to_vec());
        assert_eq!(state_of(&bot, 1).await, None, "from {}", expected);

        for follow_up in ["yes", "7"] {
            let reply = say(&bot, 1, follow_up).await;
            assert!(reply.text.contains("menu buttons"), "{} after cancelling {}", follow_up, expected);
            assert_eq!(state_of(&bot, 1).await, None);
        }
    }

    // Nothing was committed along the way
    let habits = bot.storage().list_habits(UserId(1)).await.unwrap();
    assert_eq!(habits.len(), 1);
    assert_eq!(habits[0].id, habit_id);
    assert_eq!(bot.storage().get_statistics(habit_id, Period::Year).await.unwrap(), 0);
}
