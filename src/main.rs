use iced::widget::{button, column, horizontal_space, row, scrollable, text};
use iced::{event, keyboard, time, window, Alignment, Element, Event, Length, Size, Subscription, Task, Theme};
use rfd::FileDialog;
use std::sync::Arc;
use std::time::Duration;

// Declare the application modules
mod grid;
mod picker;
mod state;
mod thumbs;
mod ui;

use grid::config::GridConfig;
use grid::coordinator::{GridCoordinator, IssuedFetch, SectionProvider};
use grid::layout::{DeviceContext, LayoutBackend, LayoutEnvironment};
use grid::section::AssetGridSection;
use picker::controller::{PickerController, PickerDelegate};
use state::data::Asset;
use state::library::{import_folder, AssetLibrary, ImportResult};
use thumbs::manager::{CachingImageManager, ImageCaching};

/// Initial window size; the picker presents as a compact sheet
const PREFERRED_WINDOW_SIZE: Size = Size::new(375.0, 568.0);
/// Vertical space taken by the navigation bar and the status row
const CHROME_HEIGHT: f32 = 96.0;
/// Fade animation frame interval, in milliseconds
const FADE_FRAME_MS: u64 = 16;

/// Reports the outcome of the picking session on stdout as JSON,
/// so the picker can sit at the end of a shell pipeline.
struct JsonDelegate;

impl PickerDelegate for JsonDelegate {
    fn assets_picked(&mut self, assets: Vec<Asset>) {
        match serde_json::to_string_pretty(&assets) {
            Ok(json) => println!("{}", json),
            Err(err) => eprintln!("⚠️  Could not encode picked assets: {}", err),
        }
    }

    fn pick_cancelled(&mut self) {
        println!("🚫 Picking cancelled");
    }
}

/// Main application state
struct MediaPicker {
    /// The catalog database
    library: AssetLibrary,
    /// Sections, cells, and selection
    grid: GridCoordinator,
    /// Editing-mode state machine and navigation chrome
    controller: PickerController,
    /// Thumbnail request lifecycle
    cache: Arc<CachingImageManager>,
    delegate: JsonDelegate,
    window: Size,
    scroll_y: f32,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the "Import Folder" button
    ImportFolder,
    /// Background import completed with results
    ImportComplete(ImportResult),
    /// A cell was tapped (section, index)
    CellPressed(usize, usize),
    /// An async thumbnail fetch resolved
    ThumbnailReady {
        section: usize,
        index: usize,
        asset_id: String,
        image: Option<iced::widget::image::Handle>,
    },
    BeginEditing,
    EndEditing,
    CancelPicker,
    OpenPicked,
    ToggleSelectAll,
    GridScrolled(f32),
    WindowResized(Size),
    WindowUnfocused,
    FadeTick,
    EscapePressed,
}

impl MediaPicker {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // Initialize the catalog
        // If this fails, we panic because the app cannot function without it
        let library = AssetLibrary::new()
            .expect("Failed to initialize catalog. Check permissions and disk space.");

        let _ = library.verify_files();
        let asset_count = library.asset_count().unwrap_or(0);
        println!("🖼️  Media picker initialized with {} assets", asset_count);

        let assets = library.fetch_assets().unwrap_or_default();
        let status = format!("Ready. {} assets in library.", assets.len());

        let cache = Arc::new(CachingImageManager::new(thumbs::cache::default_cache_dir()));
        let controller = PickerController::new(LayoutBackend::detect());
        let grid = Self::build_grid(assets, PREFERRED_WINDOW_SIZE, &cache);

        let mut picker = MediaPicker {
            library,
            grid,
            controller,
            cache,
            delegate: JsonDelegate,
            window: PREFERRED_WINDOW_SIZE,
            scroll_y: 0.0,
            status,
        };
        let warmup = picker.rebind_visible();

        (picker, warmup)
    }

    /// One grid section over the fetched collection. The configuration is
    /// fixed here and stays with the section for its whole life.
    fn build_grid(
        assets: Vec<Asset>,
        window: Size,
        cache: &Arc<CachingImageManager>,
    ) -> GridCoordinator {
        let device = DeviceContext::from_window(window);
        let config = GridConfig::for_device(&device);

        let section = AssetGridSection::new(
            assets,
            config,
            Arc::clone(cache) as Arc<dyn ImageCaching + Send + Sync>,
        );

        let mut provider = SectionProvider::new();
        provider.push(Box::new(section));
        GridCoordinator::new(provider)
    }

    fn environment(&self) -> LayoutEnvironment {
        LayoutEnvironment {
            container: Size::new(
                self.window.width,
                (self.window.height - CHROME_HEIGHT).max(0.0),
            ),
            device: DeviceContext::from_window(self.window),
        }
    }

    /// Bind the slots the current scroll position needs and start driving
    /// the thumbnail fetches that binding issued.
    fn rebind_visible(&mut self) -> Task<Message> {
        let env = self.environment();
        let backend = self.controller.backend();

        let mut tasks = Vec::new();
        for s in 0..self.grid.provider().len() {
            let window = {
                let Some(section) = self.grid.provider().get(s) else {
                    continue;
                };
                let resolved = ui::grid_view::resolve(section, &env, backend);
                ui::grid_view::visible_window(
                    &resolved,
                    section.len(),
                    self.scroll_y,
                    env.container.height,
                )
            };

            for fetch in self.grid.bind_window(s, window) {
                tasks.push(perform_fetch(fetch));
            }
        }

        Task::batch(tasks)
    }

    /// Refetch the collection and rebuild the grid section around it
    fn reload_assets(&mut self) -> Task<Message> {
        if self.controller.is_editing() {
            self.controller.end_editing(&mut self.grid);
        }

        let assets = self.library.fetch_assets().unwrap_or_default();
        self.grid = Self::build_grid(assets, self.window, &self.cache);
        self.scroll_y = 0.0;
        self.rebind_visible()
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::ImportFolder => {
                // Show the native folder picker dialog
                let folder = FileDialog::new()
                    .set_title("Select Folder with Photos and Videos")
                    .pick_folder();

                if let Some(folder_path) = folder {
                    self.status = format!("Importing from {}...", folder_path.display());
                    let db_path = self.library.path().clone();

                    return Task::perform(
                        import_folder(folder_path, db_path),
                        Message::ImportComplete,
                    );
                }

                Task::none()
            }
            Message::ImportComplete(result) => {
                self.status = format!(
                    "✅ Import complete! Added {} assets, skipped {} duplicates.",
                    result.imported_count, result.skipped_count
                );
                self.reload_assets()
            }
            Message::CellPressed(section, index) => {
                let finished = self.controller.cell_pressed(
                    &mut self.grid,
                    section,
                    index,
                    &mut self.delegate,
                );
                if finished {
                    return iced::exit();
                }
                Task::none()
            }
            Message::ThumbnailReady {
                section,
                index,
                asset_id,
                image,
            } => {
                self.grid.apply_thumbnail(section, index, &asset_id, image);
                Task::none()
            }
            Message::BeginEditing => {
                self.controller.begin_editing(&mut self.grid);
                Task::none()
            }
            Message::EndEditing => {
                self.controller.end_editing(&mut self.grid);
                Task::none()
            }
            Message::CancelPicker => {
                self.controller.cancel(&mut self.delegate);
                iced::exit()
            }
            Message::OpenPicked => {
                if self.controller.open(&self.grid, &mut self.delegate) {
                    return iced::exit();
                }
                Task::none()
            }
            Message::ToggleSelectAll => {
                self.controller.toggle_select_all(&mut self.grid);
                Task::none()
            }
            Message::GridScrolled(y) => {
                self.scroll_y = y;
                self.rebind_visible()
            }
            Message::WindowResized(size) => {
                self.window = size;
                // Stop active caching across the transition, invalidate the
                // flow backend if it is the one in use, then rebind for the
                // new geometry
                self.controller.size_changed(&self.grid, self.cache.as_ref());
                self.grid.recycle_all();
                self.rebind_visible()
            }
            Message::WindowUnfocused => {
                // The closest desktop analog of a memory-pressure signal:
                // a hidden picker has no business pre-caching thumbnails
                self.controller.memory_warning(self.cache.as_ref());
                Task::none()
            }
            Message::FadeTick => {
                self.grid.step_fades(FADE_FRAME_MS as f32);
                Task::none()
            }
            Message::EscapePressed => {
                if self.controller.is_editing() {
                    self.controller.end_editing(&mut self.grid);
                    return Task::none();
                }
                self.controller.cancel(&mut self.delegate);
                iced::exit()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<'_, Message> {
        let env = self.environment();
        let backend = self.controller.backend();

        let grid_view = ui::grid_view::view(&self.grid, &env, backend);

        let status_row = row![
            text(&self.status).size(13),
            horizontal_space(),
            button("Import Folder").on_press(Message::ImportFolder).padding(6),
        ]
        .spacing(10)
        .padding([6.0, 12.0])
        .align_y(Alignment::Center);

        column![
            ui::nav_bar::view(self.controller.nav()),
            scrollable(grid_view)
                .on_scroll(|viewport| Message::GridScrolled(viewport.absolute_offset().y))
                .width(Length::Fill)
                .height(Length::Fill),
            status_row,
        ]
        .into()
    }

    fn subscription(&self) -> Subscription<Message> {
        let mut subscriptions = vec![event::listen_with(handle_event)];

        // The fade tick only runs while a cell is actually animating
        if self.grid.any_fading() {
            subscriptions.push(
                time::every(Duration::from_millis(FADE_FRAME_MS)).map(|_| Message::FadeTick),
            );
        }

        Subscription::batch(subscriptions)
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn handle_event(event: Event, _status: event::Status, _window: window::Id) -> Option<Message> {
    match event {
        Event::Window(window::Event::Resized(size)) => Some(Message::WindowResized(size)),
        Event::Window(window::Event::Unfocused) => Some(Message::WindowUnfocused),
        Event::Keyboard(keyboard::Event::KeyPressed {
            key: keyboard::Key::Named(keyboard::key::Named::Escape),
            ..
        }) => Some(Message::EscapePressed),
        _ => None,
    }
}

/// Drive one issued fetch and deliver its result back into the update loop
fn perform_fetch(fetch: IssuedFetch) -> Task<Message> {
    let IssuedFetch {
        section,
        index,
        pending,
    } = fetch;
    let asset_id = pending.asset_id;

    Task::perform(pending.future, move |image| Message::ThumbnailReady {
        section,
        index,
        asset_id: asset_id.clone(),
        image,
    })
}

fn main() -> iced::Result {
    iced::application("Media Picker", MediaPicker::update, MediaPicker::view)
        .theme(MediaPicker::theme)
        .subscription(MediaPicker::subscription)
        .window_size(PREFERRED_WINDOW_SIZE)
        .centered()
        .run_with(MediaPicker::new)
}
