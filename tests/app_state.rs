mod test_helpers;

use lumina::catalog::DEFAULT_CATEGORY;
use lumina::client::ApiClientError;
use lumina::config::{AppConfig, DetectionTarget};
use lumina::mask::MaskArtifact;
use lumina::model::{GalleryImage, LoadedImage, NewProduct, Style};
use lumina::state::{
    AppState, Busy, Command, DEFAULT_PROMPT, DetectInput, GalleryState, Msg, NOTICE_BAD_CREDENTIALS,
    NOTICE_NO_RESULT, NOTICE_NO_SOURCE, NOTICE_PROCESSING_FAILED, NOTICE_SIGN_IN,
};
use lumina::catalog::Catalog;
use reqwest::StatusCode;
use test_helpers::{fresh_state, objects_at, png_bytes, product, remote, source_image, token};

const GENERATED: &str = "http://backend/static/gallery/generated.png";

/// Select a source, generate, and return the revision the detection is tagged with.
fn generate(state: &mut AppState) -> u64 {
    state.update(Msg::SourceSelected(source_image("room.jpg")));
    state.update(Msg::GenerateRequested);
    let commands = state.update(Msg::Generated {
        revision: state.revision,
        result: Ok(remote(GENERATED)),
    });
    commands
        .iter()
        .find_map(|c| match c {
            Command::Detect { revision, .. } => Some(*revision),
            _ => None,
        })
        .unwrap()
}

fn loaded_after(state: &mut AppState) {
    let image = state.after_image.clone().unwrap();
    state.update(Msg::AfterImageLoaded {
        image,
        result: Ok(LoadedImage::decode(png_bytes(4, 3)).unwrap()),
    });
}

fn failure() -> ApiClientError {
    ApiClientError::MalformedResponse("boom".to_string())
}

// AS-010: New source resets detections
// Test: Populate detections, then select another photo
// Expected: Object list is empty and the before image is the new photo
#[test]
fn selecting_a_source_clears_detected_objects() {
    let mut state = fresh_state();
    let revision = generate(&mut state);
    state.update(Msg::ObjectsDetected {
        revision,
        result: Ok(objects_at(&[30.0, 60.0])),
    });
    assert_eq!(state.detected_objects.len(), 2);
    assert_eq!(state.busy, Busy::Idle);

    state.update(Msg::SourceSelected(source_image("kitchen.png")));
    assert!(state.detected_objects.is_empty());
    assert_eq!(
        state.before_image,
        Some(source_image("kitchen.png").image_ref())
    );
}

#[test]
fn detection_in_flight_is_dropped_after_a_new_source() {
    let mut state = fresh_state();
    let revision = generate(&mut state);
    state.update(Msg::SourceSelected(source_image("kitchen.png")));
    assert_eq!(state.busy, Busy::Idle);

    state.update(Msg::ObjectsDetected {
        revision,
        result: Ok(objects_at(&[30.0])),
    });
    assert!(state.detected_objects.is_empty());
}

// AS-015: Generation overtaken by a new source
// Test: Generate from one photo, pick another photo, then deliver the first render
// Expected: The render is discarded, nothing is detected, the new photo stays alone
#[test]
fn generation_in_flight_is_dropped_after_a_new_source() {
    let mut state = fresh_state();
    state.update(Msg::SourceSelected(source_image("room_a.jpg")));
    let commands = state.update(Msg::GenerateRequested);
    let requested = match commands.as_slice() {
        [Command::Generate { revision, .. }] => *revision,
        other => panic!("unexpected commands: {other:?}"),
    };

    state.update(Msg::SourceSelected(source_image("room_b.jpg")));
    assert_eq!(state.busy, Busy::Idle);

    let commands = state.update(Msg::Generated {
        revision: requested,
        result: Ok(remote("http://backend/static/gallery/render_of_a.png")),
    });
    assert!(commands.is_empty());
    assert_eq!(state.after_image, None);
    assert_eq!(state.before_image, Some(source_image("room_b.jpg").image_ref()));
    assert_eq!(state.busy, Busy::Idle);

    // the new photo can be generated right away
    let commands = state.update(Msg::GenerateRequested);
    assert!(matches!(
        commands.as_slice(),
        [Command::Generate { request, .. }] if request.image.file_name == "room_b.jpg"
    ));
}

#[test]
fn inpainting_in_flight_is_dropped_after_a_new_source() {
    let mut state = fresh_state();
    let revision = generate(&mut state);
    state.update(Msg::ObjectsDetected {
        revision,
        result: Ok(Vec::new()),
    });
    loaded_after(&mut state);
    state.update(Msg::MaskingStarted);
    let commands = state.update(Msg::MaskValidated(MaskArtifact {
        png: Vec::new(),
        width: 4,
        height: 3,
    }));
    let requested = match commands.as_slice() {
        [Command::Inpaint { revision, .. }] => *revision,
        other => panic!("unexpected commands: {other:?}"),
    };

    state.update(Msg::SourceSelected(source_image("kitchen.png")));
    assert_eq!(state.busy, Busy::Idle);
    let commands = state.update(Msg::Inpainted {
        revision: requested,
        result: Ok(remote("http://backend/static/gallery/inpainted.png")),
    });
    assert!(commands.is_empty());
    assert_eq!(state.after_image, Some(remote(GENERATED)));
}

#[test]
fn blank_prompt_uses_the_configured_default() {
    let mut config = AppConfig::default();
    config.session.default_prompt = "scandinavian living room".to_string();
    let mut state = AppState::new(&config, Catalog::builtin());
    state.update(Msg::SourceSelected(source_image("room.jpg")));
    state.update(Msg::PromptChanged("  ".to_string()));

    let commands = state.update(Msg::GenerateRequested);
    assert!(matches!(
        commands.as_slice(),
        [Command::Generate { request, .. }] if request.prompt == "scandinavian living room"
    ));
}

#[test]
fn generate_without_source_raises_a_notice() {
    let mut state = fresh_state();
    let commands = state.update(Msg::GenerateRequested);
    assert!(commands.is_empty());
    assert_eq!(state.notice.as_deref(), Some(NOTICE_NO_SOURCE));
    assert_eq!(state.busy, Busy::Idle);

    state.update(Msg::NoticeDismissed);
    assert!(state.notice.is_none());
}

#[test]
fn generate_uses_default_prompt_and_selected_style() {
    let mut state = fresh_state();
    state.update(Msg::SourceSelected(source_image("room.jpg")));
    state.update(Msg::StyleSelected(Style::Japandi));
    let commands = state.update(Msg::GenerateRequested);

    assert_eq!(state.busy, Busy::Generating);
    assert!(state.compare_props().is_generating);
    match commands.as_slice() {
        [Command::Generate { request, .. }] => {
            assert_eq!(request.prompt, DEFAULT_PROMPT);
            assert_eq!(request.style, Style::Japandi);
            assert_eq!(request.image.file_name, "room.jpg");
        }
        other => panic!("unexpected commands: {other:?}"),
    }

    // a second request while busy is ignored
    assert!(state.update(Msg::GenerateRequested).is_empty());
}

#[test]
fn generation_result_triggers_load_and_detection_on_the_source() {
    let mut state = fresh_state();
    state.update(Msg::SourceSelected(source_image("room.jpg")));
    state.update(Msg::GenerateRequested);
    let commands = state.update(Msg::Generated {
        revision: state.revision,
        result: Ok(remote(GENERATED)),
    });

    assert_eq!(state.after_image, Some(remote(GENERATED)));
    assert_eq!(state.busy, Busy::Detecting);
    assert!(matches!(&commands[0], Command::LoadAfterImage(image) if *image == remote(GENERATED)));
    match &commands[1] {
        Command::Detect {
            input: DetectInput::Upload(upload),
            revision,
        } => {
            assert_eq!(upload.file_name, "room.jpg");
            assert_eq!(*revision, state.revision);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn detection_can_target_the_generated_image() {
    let mut config = AppConfig::default();
    config.detection.target = DetectionTarget::Generated;
    let mut state = AppState::new(&config, Catalog::builtin());
    state.update(Msg::SourceSelected(source_image("room.jpg")));
    state.update(Msg::GenerateRequested);
    let commands = state.update(Msg::Generated {
        revision: state.revision,
        result: Ok(remote(GENERATED)),
    });

    assert!(commands.iter().any(|c| matches!(
        c,
        Command::Detect { input: DetectInput::Fetch(image), .. } if *image == remote(GENERATED)
    )));
}

#[test]
fn generation_failure_notifies_and_returns_to_idle() {
    let mut state = fresh_state();
    state.update(Msg::SourceSelected(source_image("room.jpg")));
    state.update(Msg::GenerateRequested);
    let commands = state.update(Msg::Generated {
        revision: state.revision,
        result: Err(failure()),
    });
    assert!(commands.is_empty());
    assert_eq!(state.busy, Busy::Idle);
    assert_eq!(state.notice.as_deref(), Some(NOTICE_PROCESSING_FAILED));
}

// AS-020: Stale detections
// Test: Replace the after image from the gallery while detection runs
// Expected: The late detection result is discarded
#[test]
fn stale_detection_results_are_discarded() {
    let mut state = fresh_state();
    let revision = generate(&mut state);

    state.update(Msg::GalleryOpened);
    state.update(Msg::GalleryImageChosen(GalleryImage {
        id: "a.png".to_string(),
        url: "http://backend/static/gallery/a.png".to_string(),
    }));
    assert_eq!(state.busy, Busy::Idle);
    assert_ne!(state.revision, revision);

    let commands = state.update(Msg::ObjectsDetected {
        revision,
        result: Ok(objects_at(&[50.0])),
    });
    assert!(commands.is_empty());
    assert!(state.detected_objects.is_empty());
}

#[test]
fn detection_failure_keeps_the_new_image() {
    let mut state = fresh_state();
    let revision = generate(&mut state);
    state.update(Msg::ObjectsDetected {
        revision,
        result: Err(failure()),
    });
    assert_eq!(state.busy, Busy::Idle);
    assert_eq!(state.after_image, Some(remote(GENERATED)));
    assert!(state.notice.is_some());
}

#[test]
fn image_load_for_a_replaced_image_is_ignored() {
    let mut state = fresh_state();
    generate(&mut state);
    state.update(Msg::AfterImageLoaded {
        image: remote("http://backend/static/gallery/old.png"),
        result: Ok(LoadedImage::decode(png_bytes(2, 2)).unwrap()),
    });
    assert!(state.after_loaded.is_none());

    loaded_after(&mut state);
    assert_eq!(state.after_loaded.as_ref().map(|l| l.width()), Some(4));
}

#[test]
fn object_click_selects_category_suggestions() {
    let mut state = fresh_state();
    state.update(Msg::ObjectClicked(lumina::model::DetectedObject::new("plant", 70.0, 40.0)));
    assert_eq!(state.active_label.as_deref(), Some("plant"));
    assert!(state.suggestions.iter().all(|p| p.category == "plant"));

    state.update(Msg::ObjectClicked(lumina::model::DetectedObject::new("bed", 70.0, 40.0)));
    assert!(state.suggestions.iter().all(|p| p.category == DEFAULT_CATEGORY));
}

// AS-030: Masking flow
// Test: Start masking before and after the result is decoded, then validate
// Expected: Needs a decoded result; validation emits an inpaint request
#[test]
fn masking_requires_a_decoded_result() {
    let mut state = fresh_state();
    state.update(Msg::MaskingStarted);
    assert!(!state.masking);
    assert_eq!(state.notice.as_deref(), Some(NOTICE_NO_RESULT));

    let revision = generate(&mut state);
    state.update(Msg::ObjectsDetected {
        revision,
        result: Ok(Vec::new()),
    });
    loaded_after(&mut state);
    state.update(Msg::MaskingStarted);
    assert!(state.masking);

    let commands = state.update(Msg::MaskValidated(MaskArtifact {
        png: vec![1, 2, 3],
        width: 4,
        height: 3,
    }));
    assert!(!state.masking);
    assert_eq!(state.busy, Busy::Inpainting);
    match commands.as_slice() {
        [Command::Inpaint { request, .. }] => {
            assert_eq!(request.image.file_name, "generated.png");
            assert_eq!(request.mask.png, vec![1, 2, 3]);
            assert_eq!(request.prompt, DEFAULT_PROMPT);
        }
        other => panic!("unexpected commands: {other:?}"),
    }
}

#[test]
fn masking_is_refused_while_busy() {
    let mut state = fresh_state();
    generate(&mut state);
    loaded_after(&mut state);
    assert_eq!(state.busy, Busy::Detecting);
    state.update(Msg::MaskingStarted);
    assert!(!state.masking);
}

#[test]
fn inpaint_result_replaces_image_and_clears_objects() {
    let mut state = fresh_state();
    let revision = generate(&mut state);
    state.update(Msg::ObjectsDetected {
        revision,
        result: Ok(objects_at(&[10.0, 90.0])),
    });
    loaded_after(&mut state);
    state.update(Msg::MaskingStarted);
    state.update(Msg::MaskValidated(MaskArtifact {
        png: Vec::new(),
        width: 4,
        height: 3,
    }));

    let inpainted = remote("http://backend/static/gallery/inpainted.png");
    let commands = state.update(Msg::Inpainted {
        revision: state.revision,
        result: Ok(inpainted.clone()),
    });
    assert_eq!(state.busy, Busy::Idle);
    assert_eq!(state.after_image, Some(inpainted.clone()));
    assert!(state.after_loaded.is_none());
    assert!(state.detected_objects.is_empty());
    assert!(matches!(commands.as_slice(), [Command::LoadAfterImage(image)] if *image == inpainted));
}

#[test]
fn cancelled_mask_leaves_state_untouched() {
    let mut state = fresh_state();
    let revision = generate(&mut state);
    state.update(Msg::ObjectsDetected {
        revision,
        result: Ok(Vec::new()),
    });
    loaded_after(&mut state);
    state.update(Msg::MaskingStarted);
    let commands = state.update(Msg::MaskCancelled);
    assert!(commands.is_empty());
    assert!(!state.masking);
    assert_eq!(state.busy, Busy::Idle);
}

#[test]
fn gallery_failure_shows_an_empty_list() {
    let mut state = fresh_state();
    let commands = state.update(Msg::GalleryOpened);
    assert!(matches!(commands.as_slice(), [Command::FetchGallery]));
    assert_eq!(state.gallery, GalleryState::Loading);

    state.update(Msg::GalleryLoaded(Err(failure())));
    assert_eq!(state.gallery, GalleryState::Loaded(Vec::new()));
    assert!(state.notice.is_none());

    state.update(Msg::GalleryClosed);
    assert_eq!(state.gallery, GalleryState::Closed);
}

#[test]
fn choosing_a_gallery_image_loads_it_as_the_result() {
    let mut state = fresh_state();
    state.update(Msg::GalleryOpened);
    let commands = state.update(Msg::GalleryImageChosen(GalleryImage {
        id: "a.png".to_string(),
        url: "http://backend/static/gallery/a.png".to_string(),
    }));
    assert_eq!(state.gallery, GalleryState::Closed);
    assert_eq!(
        state.after_image,
        Some(remote("http://backend/static/gallery/a.png"))
    );
    assert!(matches!(commands.as_slice(), [Command::LoadAfterImage(_)]));
}

#[test]
fn wrong_credentials_have_a_dedicated_notice() {
    let mut state = fresh_state();
    state.update(Msg::LoginCompleted(Err(ApiClientError::UnexpectedStatus {
        status: StatusCode::UNAUTHORIZED,
        text: "{\"detail\":\"Incorrect username or password\"}".to_string(),
    })));
    assert_eq!(state.notice.as_deref(), Some(NOTICE_BAD_CREDENTIALS));
    assert!(state.session.is_none());

    state.update(Msg::LoginCompleted(Ok(token())));
    assert!(state.session.is_some());
    state.update(Msg::LoggedOut);
    assert!(state.session.is_none());
}

#[test]
fn product_management_needs_a_session() {
    let mut state = fresh_state();
    let new_product = NewProduct {
        name: "Rattan Chair".to_string(),
        price: "79€".to_string(),
        link: "https://shop.example.com/rattan".to_string(),
        category: "chair".to_string(),
        image: source_image("chair.png"),
    };

    assert!(state.update(Msg::ProductSubmitted(new_product.clone())).is_empty());
    assert_eq!(state.notice.as_deref(), Some(NOTICE_SIGN_IN));
    assert!(state.update(Msg::ProductDeleteRequested("101".to_string())).is_empty());

    state.update(Msg::LoginCompleted(Ok(token())));
    let commands = state.update(Msg::ProductSubmitted(new_product));
    assert!(matches!(
        commands.as_slice(),
        [Command::AddProduct { token, product }] if token.access_token == "secret" && product.name == "Rattan Chair"
    ));
    let commands = state.update(Msg::ProductDeleteRequested("101".to_string()));
    assert!(matches!(commands.as_slice(), [Command::DeleteProduct { id, .. }] if id == "101"));
}

#[test]
fn added_and_deleted_products_update_suggestions() {
    let mut state = fresh_state();
    state.update(Msg::ObjectClicked(lumina::model::DetectedObject::new("chair", 80.0, 40.0)));
    let before = state.suggestions.len();

    state.update(Msg::ProductAdded(Ok(product("42", "Rattan Chair", "chair"))));
    assert_eq!(state.suggestions.len(), before + 1);

    state.update(Msg::ProductDeleted {
        id: "42".to_string(),
        result: Ok(()),
    });
    assert_eq!(state.suggestions.len(), before);
}

#[test]
fn startup_fetches_remote_products() {
    let mut state = fresh_state();
    let commands = state.update(Msg::Started);
    assert!(matches!(commands.as_slice(), [Command::FetchProducts]));

    state.update(Msg::ProductsLoaded(Ok(vec![product("7", "Rattan Chair", "chair")])));
    assert!(
        state
            .catalog
            .suggestions_for("chair")
            .iter()
            .any(|p| p.id == "7")
    );

    // failures keep the bundled catalog
    let len = state.catalog.len();
    state.update(Msg::ProductsLoaded(Err(failure())));
    assert_eq!(state.catalog.len(), len);
}
