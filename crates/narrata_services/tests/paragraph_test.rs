use narrata_interface::SceneSegmenter;
use narrata_services::ParagraphSegmenter;

const STORY: &str = "Elena climbed the stairs inside the old lighthouse. The wind howled.\n\n\
Tomas waited on the pier, counting the waves.\n\n\
Suddenly the lamp went dark! Elena screamed! Where was Tomas?";

#[tokio::test]
async fn one_scene_per_paragraph_in_order() {
    let segmenter = ParagraphSegmenter::new().unwrap();
    let scenes = segmenter.segment(STORY).await.unwrap();

    assert_eq!(scenes.len(), 3);
    for (i, scene) in scenes.iter().enumerate() {
        assert_eq!(*scene.order(), i);
        assert_eq!(scene.id(), &format!("scene_{}", i + 1));
    }
    assert!(scenes[1].text().starts_with("Tomas waited"));
}

#[tokio::test]
async fn recurring_names_become_characters() {
    let segmenter = ParagraphSegmenter::new().unwrap();
    let scenes = segmenter.segment(STORY).await.unwrap();

    assert_eq!(scenes[0].characters(), &vec!["Elena".to_string()]);
    assert_eq!(
        scenes[2].characters(),
        &vec!["Elena".to_string(), "Tomas".to_string()]
    );
    assert!(!scenes[0].characters().contains(&"The".to_string()));
}

#[tokio::test]
async fn exclamations_raise_action_level() {
    let segmenter = ParagraphSegmenter::new().unwrap();
    let scenes = segmenter.segment(STORY).await.unwrap();

    assert_eq!(*scenes[1].action_level(), 0.0);
    assert!(*scenes[2].action_level() > 0.5);
    assert!(*scenes[2].action_level() <= 1.0);
}

#[tokio::test]
async fn setting_and_mood_are_derived() {
    let segmenter = ParagraphSegmenter::new().unwrap();
    let scenes = segmenter.segment(STORY).await.unwrap();

    assert_eq!(scenes[0].setting().as_deref(), Some("the old lighthouse"));
    assert_eq!(scenes[2].mood().as_deref(), Some("tense"));
}

#[tokio::test]
async fn long_single_paragraph_is_split_by_sentences() {
    let segmenter = ParagraphSegmenter::new().unwrap().with_sentences_per_scene(2);
    let text = "One. Two. Three. Four. Five.";

    let scenes = segmenter.segment(text).await.unwrap();

    let texts: Vec<&str> = scenes.iter().map(|s| s.text().as_str()).collect();
    assert_eq!(texts, vec!["One. Two.", "Three. Four.", "Five."]);
}

#[tokio::test]
async fn short_single_paragraph_stays_whole() {
    let segmenter = ParagraphSegmenter::new().unwrap();
    let scenes = segmenter.segment("  A short tale.  ").await.unwrap();

    assert_eq!(scenes.len(), 1);
    assert_eq!(scenes[0].text(), "A short tale.");
}

#[tokio::test]
async fn blank_text_yields_single_fallback_scene() {
    let segmenter = ParagraphSegmenter::new().unwrap();
    let scenes = segmenter.segment("\n\n   \n").await.unwrap();

    assert_eq!(scenes.len(), 1);
    assert_eq!(scenes[0].text(), "");
}
