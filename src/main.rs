//! MEMORY MATCH - find the pairs, then watch them bounce away

mod board;
mod card;
mod geometry;
mod physics;
mod timestep;

use bevy::{
    audio::{PlaybackMode, Volume},
    prelude::*,
    window::PrimaryWindow,
};
use rand::Rng;

use board::{deal, slot_center, CARD_COUNT, CARD_HEIGHT, CARD_WIDTH, WINDOW_HEIGHT, WINDOW_WIDTH};
use card::{evaluate_board, modify_color, CardState, PairOutcome};
use geometry::Bounds;
use physics::{exited, integrate, FallingBody, FLOOR_Y, LAUNCH_VELOCITY, PHYSICS_HZ};
use timestep::FixedTimestep;

// Card trim
const SHADOW_OFFSET: f32 = 3.0;
const BORDER_THICKNESS: f32 = 1.0;
const LABEL_FONT_SIZE: f32 = 20.0;
const FINALE_LABEL: &str = ":)";

// Components
#[derive(Component)]
struct Card {
    slot: usize,
    value: &'static str,
    state: CardState,
    hovering: bool,
}

#[derive(Component)]
struct CardShadow {
    slot: usize,
}

#[derive(Component)]
struct CardBorder {
    slot: usize,
}

#[derive(Component)]
struct CardLabel {
    slot: usize,
}

/// Finale velocity, in pixels per physics step. `moved` flips when the
/// card takes its first step so its label can switch to the finale glyph.
#[derive(Component)]
struct Falling {
    vel: Vec2,
    moved: bool,
}

// Resources
#[derive(Resource, Default)]
struct Game {
    cheat: bool,
    finished: bool,
    timestep: Option<FixedTimestep>,
    order: Vec<Entity>,
}

#[derive(Resource)]
struct GameSounds {
    success: Handle<AudioSource>,
    failure: Handle<AudioSource>,
    bounce: Handle<AudioSource>,
}

// Events for audio playback
#[derive(Event)]
struct PlaySound {
    kind: SoundKind,
    volume: f32,
}

#[derive(Clone, Copy)]
enum SoundKind {
    Success,
    Failure,
    Bounce,
}

impl PlaySound {
    fn new(kind: SoundKind) -> Self {
        Self { kind, volume: 1.0 }
    }

    fn with_volume(kind: SoundKind, volume: f32) -> Self {
        Self { kind, volume }
    }
}

/// Mesh for the drop shadow: full-width 1 px strokes every 2 px, so the
/// shadow reads as a dashed halftone instead of a solid slab.
fn striped_shadow_mesh(width: f32, height: f32) -> Mesh {
    use bevy::render::mesh::{Indices, PrimitiveTopology};

    let hw = width / 2.0;
    let hh = height / 2.0;

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut uvs: Vec<[f32; 2]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    let mut y = 0.0;
    while y < height {
        let top = hh - y;
        let bottom = top - 1.0;
        let base = positions.len() as u32;
        positions.extend([
            [-hw, bottom, 0.0],
            [hw, bottom, 0.0],
            [hw, top, 0.0],
            [-hw, top, 0.0],
        ]);
        for &[px, py, _] in &positions[base as usize..] {
            uvs.push([px / width + 0.5, py / height + 0.5]);
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        y += 2.0;
    }

    Mesh::new(PrimitiveTopology::TriangleList, default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: format!("{CARD_COUNT} cards, 0 obtained"),
                resolution: (WINDOW_WIDTH, WINDOW_HEIGHT).into(),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::BLACK))
        .init_resource::<Game>()
        .add_event::<PlaySound>()
        .add_systems(Startup, (setup, setup_audio))
        .add_systems(
            Update,
            (
                (
                    quit_on_escape,
                    cheat_toggle,
                    debug_obtain_all,
                    clear_failed,
                    hover_cards,
                    click_cards,
                    evaluate_pairs,
                    start_finale,
                    finale_tick,
                )
                    .chain(),
                update_card_visuals,
                sync_card_parts,
                update_window_title,
                handle_sound_events,
            ),
        )
        .run();
}

fn setup(
    mut cmd: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut mats: ResMut<Assets<ColorMaterial>>,
) {
    cmd.spawn(Camera2d);

    let mut rng = rand::rng();
    let values = deal(&mut rng);

    let fill_mesh = meshes.add(Rectangle::new(CARD_WIDTH, CARD_HEIGHT));
    let border_mesh = meshes.add(Rectangle::new(
        CARD_WIDTH + 2.0 * BORDER_THICKNESS,
        CARD_HEIGHT + 2.0 * BORDER_THICKNESS,
    ));
    let shadow_mesh = meshes.add(striped_shadow_mesh(CARD_WIDTH, CARD_HEIGHT));

    for (slot, value) in values.into_iter().enumerate() {
        let center = slot_center(slot);
        let fill = CardState::default().fill_color(false, 0.0);

        cmd.spawn((
            Mesh2d(fill_mesh.clone()),
            MeshMaterial2d(mats.add(ColorMaterial::from(fill))),
            Transform::from_xyz(center.x, center.y, 0.0),
            Card {
                slot,
                value,
                state: CardState::default(),
                hovering: false,
            },
        ));
        cmd.spawn((
            Mesh2d(shadow_mesh.clone()),
            MeshMaterial2d(mats.add(ColorMaterial::from(modify_color(fill, 0.5)))),
            Transform::from_xyz(center.x + SHADOW_OFFSET, center.y - SHADOW_OFFSET, -0.2),
            CardShadow { slot },
        ));
        cmd.spawn((
            Mesh2d(border_mesh.clone()),
            MeshMaterial2d(mats.add(ColorMaterial::from(modify_color(fill, 1.2)))),
            Transform::from_xyz(center.x, center.y, -0.1),
            CardBorder { slot },
        ));
        cmd.spawn((
            Text2d::new(card::HIDDEN_LABEL),
            TextFont {
                font_size: LABEL_FONT_SIZE,
                ..default()
            },
            TextColor(modify_color(fill, 0.7)),
            Transform::from_xyz(center.x, center.y, 1.0),
            CardLabel { slot },
        ));
    }
}

fn setup_audio(mut cmd: Commands, asset_server: Res<AssetServer>) {
    cmd.insert_resource(GameSounds {
        success: asset_server.load("sounds/success.ogg"),
        failure: asset_server.load("sounds/failure.ogg"),
        bounce: asset_server.load("sounds/bounce.ogg"),
    });
}

fn handle_sound_events(
    mut cmd: Commands,
    mut events: EventReader<PlaySound>,
    sounds: Option<Res<GameSounds>>,
) {
    let Some(sounds) = sounds else { return };

    for event in events.read() {
        let source = match event.kind {
            SoundKind::Success => sounds.success.clone(),
            SoundKind::Failure => sounds.failure.clone(),
            SoundKind::Bounce => sounds.bounce.clone(),
        };
        cmd.spawn((
            AudioPlayer::new(source),
            PlaybackSettings {
                mode: PlaybackMode::Despawn,
                volume: Volume::new(event.volume),
                ..default()
            },
        ));
    }
}

fn quit_on_escape(keys: Res<ButtonInput<KeyCode>>, mut exit: EventWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.send(AppExit::Success);
    }
}

// Cheat mode shows every value while C is held, without touching card state.
fn cheat_toggle(keys: Res<ButtonInput<KeyCode>>, mut game: ResMut<Game>) {
    game.cheat = keys.pressed(KeyCode::KeyC);
}

fn debug_obtain_all(keys: Res<ButtonInput<KeyCode>>, mut cards: Query<&mut Card>) {
    if keys.just_pressed(KeyCode::KeyW) {
        for mut card in cards.iter_mut() {
            card.state.obtain();
        }
    }
}

fn clear_failed(time: Res<Time>, mut cards: Query<&mut Card>) {
    let now = time.elapsed_secs();
    for mut card in cards.iter_mut() {
        card.state.clear_failed(now);
    }
}

fn hover_cards(
    game: Res<Game>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cam: Query<(&Camera, &GlobalTransform)>,
    mut cards: Query<(&mut Card, &Transform)>,
) {
    if game.finished {
        return;
    }
    let Ok(win) = windows.get_single() else {
        return;
    };
    let Ok((camera, cam_t)) = cam.get_single() else {
        return;
    };
    let Some(cursor) = win.cursor_position() else {
        return;
    };
    let Ok(world) = camera.viewport_to_world_2d(cam_t, cursor) else {
        return;
    };

    for (mut card, t) in cards.iter_mut() {
        let bounds = Bounds::centered(
            t.translation.truncate(),
            Vec2::new(CARD_WIDTH, CARD_HEIGHT),
        );
        card.hovering = bounds.contains(world);
    }
}

fn click_cards(
    game: Res<Game>,
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cam: Query<(&Camera, &GlobalTransform)>,
    mut cards: Query<(&mut Card, &Transform)>,
) {
    if game.finished || !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Ok(win) = windows.get_single() else {
        return;
    };
    let Ok((camera, cam_t)) = cam.get_single() else {
        return;
    };
    let Some(cursor) = win.cursor_position() else {
        return;
    };
    let Ok(world) = camera.viewport_to_world_2d(cam_t, cursor) else {
        return;
    };

    let opened = cards.iter().filter(|(card, _)| card.state.opened).count();
    for (mut card, t) in cards.iter_mut() {
        let bounds = Bounds::centered(
            t.translation.truncate(),
            Vec2::new(CARD_WIDTH, CARD_HEIGHT),
        );
        if bounds.contains(world) && card.state.click(opened < 2) {
            info!("card {} clicked", card.value);
        }
    }
}

fn evaluate_pairs(
    game: Res<Game>,
    time: Res<Time>,
    mut cards: Query<&mut Card>,
    mut sounds: EventWriter<PlaySound>,
) {
    if game.finished {
        return;
    }
    let now = time.elapsed_secs();
    let outcome = evaluate_board(
        cards.iter_mut().map(|card| {
            let card = card.into_inner();
            (card.value, &mut card.state)
        }),
        now,
    );
    match outcome {
        Some(PairOutcome::Matched) => {
            sounds.send(PlaySound::new(SoundKind::Success));
        }
        Some(PairOutcome::Mismatched) => {
            sounds.send(PlaySound::new(SoundKind::Failure));
        }
        None => {}
    }
}

fn start_finale(
    mut cmd: Commands,
    mut game: ResMut<Game>,
    mut mats: ResMut<Assets<ColorMaterial>>,
    cards: Query<(Entity, &Card, &Transform, &MeshMaterial2d<ColorMaterial>)>,
    shadows: Query<(&CardShadow, &MeshMaterial2d<ColorMaterial>)>,
    borders: Query<(&CardBorder, &MeshMaterial2d<ColorMaterial>)>,
    mut labels: Query<(&CardLabel, &mut TextColor)>,
) {
    if game.finished || cards.is_empty() || !cards.iter().all(|(_, c, _, _)| c.state.obtained) {
        return;
    }
    game.finished = true;
    game.timestep = Some(FixedTimestep::new(PHYSICS_HZ));

    let mut rng = rand::rng();
    let mut slot_colors = [Color::BLACK; CARD_COUNT];
    let mut order: Vec<(Entity, Vec2)> = Vec::with_capacity(CARD_COUNT);

    for (entity, card, t, mat) in cards.iter() {
        let color = Color::srgb_u8(
            rng.random_range(40..=255),
            rng.random_range(40..=255),
            rng.random_range(40..=255),
        );
        slot_colors[card.slot] = color;
        if let Some(mat) = mats.get_mut(&mat.0) {
            mat.color = color;
        }
        cmd.entity(entity).insert(Falling {
            vel: LAUNCH_VELOCITY,
            moved: false,
        });
        order.push((entity, t.translation.truncate()));
    }

    for (shadow, mat) in shadows.iter() {
        if let Some(mat) = mats.get_mut(&mat.0) {
            mat.color = modify_color(slot_colors[shadow.slot], 0.5);
        }
    }
    for (border, mat) in borders.iter() {
        if let Some(mat) = mats.get_mut(&mat.0) {
            mat.color = modify_color(slot_colors[border.slot], 1.2);
        }
    }
    for (label, mut color) in labels.iter_mut() {
        color.0 = modify_color(slot_colors[label.slot], 0.7);
    }

    // Bottom-to-top, right-to-left: the lowest cards leave first.
    order.sort_by(|(_, a), (_, b)| a.y.total_cmp(&b.y).then(b.x.total_cmp(&a.x)));
    game.order = order.into_iter().map(|(entity, _)| entity).collect();

    info!("all pairs found, starting finale");
}

fn finale_tick(
    time: Res<Time>,
    mut game: ResMut<Game>,
    mut cards: Query<(&mut Transform, &mut Falling), With<Card>>,
    mut sounds: EventWriter<PlaySound>,
    mut exit: EventWriter<AppExit>,
) {
    if !game.finished {
        return;
    }
    let Game {
        order, timestep, ..
    } = &mut *game;
    let Some(timestep) = timestep.as_mut() else {
        return;
    };
    // Falling is inserted through Commands at finale entry; wait for it to
    // land before the first scan, or an empty scan would read as "done".
    if order.iter().all(|&entity| cards.get(entity).is_err()) {
        return;
    }

    let keep_going = timestep.advance(time.delta_secs(), || {
        // One card per physics step, in finale order: the cards stream out
        // one after another instead of drifting off in formation.
        for &entity in order.iter() {
            let Ok((mut t, mut falling)) = cards.get_mut(entity) else {
                continue;
            };
            if exited(t.translation.x) {
                continue;
            }
            falling.moved = true;
            let mut body = FallingBody {
                center: t.translation.truncate(),
                vel: falling.vel,
            };
            if let Some(impact) = integrate(&mut body, FLOOR_Y) {
                sounds.send(PlaySound::with_volume(
                    SoundKind::Bounce,
                    (impact / 5.0).min(1.0),
                ));
            }
            t.translation.x = body.center.x;
            t.translation.y = body.center.y;
            falling.vel = body.vel;
            return true;
        }
        false
    });

    if !keep_going {
        exit.send(AppExit::Success);
    }
}

fn update_card_visuals(
    time: Res<Time>,
    game: Res<Game>,
    mut mats: ResMut<Assets<ColorMaterial>>,
    cards: Query<(&Card, Option<&Falling>, &MeshMaterial2d<ColorMaterial>)>,
    shadows: Query<(&CardShadow, &MeshMaterial2d<ColorMaterial>)>,
    borders: Query<(&CardBorder, &MeshMaterial2d<ColorMaterial>)>,
    mut labels: Query<(&CardLabel, &mut Text2d, &mut TextColor)>,
) {
    let now = time.elapsed_secs();

    if game.finished {
        // Colors were frozen at finale entry; only the labels change, card
        // by card as each one starts moving.
        for (card, falling, _) in cards.iter() {
            if falling.is_some_and(|f| f.moved) {
                for (label, mut text, _) in labels.iter_mut() {
                    if label.slot == card.slot && text.0 != FINALE_LABEL {
                        text.0 = FINALE_LABEL.to_string();
                    }
                }
            }
        }
        return;
    }

    let mut slot_colors = [Color::BLACK; CARD_COUNT];
    for (card, _, mat) in cards.iter() {
        let fill = card.state.fill_color(card.hovering, now);
        slot_colors[card.slot] = fill;
        if let Some(mat) = mats.get_mut(&mat.0) {
            mat.color = fill;
        }
        for (label, mut text, mut color) in labels.iter_mut() {
            if label.slot == card.slot {
                let label_text = card.state.label(card.value, game.cheat);
                if text.0 != label_text {
                    text.0 = label_text;
                }
                color.0 = modify_color(fill, 0.7);
            }
        }
    }
    for (shadow, mat) in shadows.iter() {
        if let Some(mat) = mats.get_mut(&mat.0) {
            mat.color = modify_color(slot_colors[shadow.slot], 0.5);
        }
    }
    for (border, mat) in borders.iter() {
        if let Some(mat) = mats.get_mut(&mat.0) {
            mat.color = modify_color(slot_colors[border.slot], 1.2);
        }
    }
}

fn sync_card_parts(
    cards: Query<(&Card, &Transform)>,
    mut shadows: Query<(&CardShadow, &mut Transform), Without<Card>>,
    mut borders: Query<(&CardBorder, &mut Transform), (Without<Card>, Without<CardShadow>)>,
    mut labels: Query<
        (&CardLabel, &mut Transform),
        (Without<Card>, Without<CardShadow>, Without<CardBorder>),
    >,
) {
    let mut centers = [Vec2::ZERO; CARD_COUNT];
    for (card, t) in cards.iter() {
        centers[card.slot] = t.translation.truncate();
    }
    for (shadow, mut t) in shadows.iter_mut() {
        let c = centers[shadow.slot];
        t.translation.x = c.x + SHADOW_OFFSET;
        t.translation.y = c.y - SHADOW_OFFSET;
    }
    for (border, mut t) in borders.iter_mut() {
        let c = centers[border.slot];
        t.translation.x = c.x;
        t.translation.y = c.y;
    }
    for (label, mut t) in labels.iter_mut() {
        let c = centers[label.slot];
        t.translation.x = c.x;
        t.translation.y = c.y;
    }
}

fn update_window_title(
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
    cards: Query<&Card>,
) {
    let Ok(mut win) = windows.get_single_mut() else {
        return;
    };
    let total = cards.iter().count();
    let obtained = cards.iter().filter(|card| card.state.obtained).count();
    win.title = format!("{total} cards, {obtained} obtained");
}
