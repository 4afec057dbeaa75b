use crate::ticker::IntervalTicker;
use crate::utils::*;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use sweeper_core::{
    ActionUpdate, CellUpdate, CellView, Coord2, Face, Frame, GameConfig, GameSignal,
    RandomMinefieldGenerator, Session, ToNdIndex, format_counter, is_within_one,
};
use yew::prelude::*;

type GameSession = Session<RandomMinefieldGenerator, IntervalTicker>;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    struct MouseButtons: u16 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
        const BACK    = 1 << 3;
        const FORWARD = 1 << 4;
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) struct TileState {
    pos: Coord2,
    buttons: MouseButtons,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub(crate) enum TileMsg {
    Update(TileState),
    Leave,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    TileEvent(TileMsg),
    Tick,
    NewGame,
}

#[derive(Properties, Clone, PartialEq)]
pub(crate) struct GameProps {
    /// Seed for the board generator, drawn from `Math.random` when absent
    #[prop_or_default]
    pub seed: Option<u64>,
}

#[derive(Properties, Clone, PartialEq)]
struct TileProps {
    pos: Coord2,
    view: CellView,
    #[prop_or_default]
    pressed: bool,
    callback: Callback<TileMsg>,
}

#[function_component(Tile)]
fn tile_component(props: &TileProps) -> Html {
    use CellView::*;

    let TileProps {
        pos,
        view,
        pressed,
        callback,
    } = props.clone();
    let mut class = classes!(
        "cell",
        match view {
            Hidden => classes!(),
            Number(count) => classes!("open", format!("num-{}", count)),
            Flagged => classes!("flag"),
            Exploded => classes!("mine", "oops"),
            Mine => classes!("mine"),
            IncorrectFlag => classes!("flag", "wrong"),
        }
    );
    if pressed {
        class.push("open");
    }

    let on_buttons = |name: &'static str| {
        let callback = callback.clone();
        Callback::from(move |e: MouseEvent| {
            let buttons = MouseButtons::from_bits_truncate(e.buttons());
            callback.emit(TileMsg::Update(TileState { pos, buttons }));
            log::trace!("{:?} mouse {} ({:?})", pos, name, buttons);
        })
    };
    let onmousedown = on_buttons("down");
    let onmouseup = on_buttons("up");
    let onmouseenter = on_buttons("enter");

    let onmouseleave = {
        let callback = callback.clone();
        Callback::from(move |_: MouseEvent| {
            callback.emit(TileMsg::Leave);
            log::trace!("{:?} mouse leave", pos);
        })
    };

    html! {
        <td {class} {onmousedown} {onmouseup} {onmouseenter} {onmouseleave}>{cell_text(view)}</td>
    }
}

pub(crate) struct GameView {
    session: GameSession,
    frame: Frame,
    cur_tile_state: Option<TileState>,
}

impl GameView {
    fn create_session(ctx: &Context<Self>, seed: u64) -> GameSession {
        log::debug!("new game, seed: {}", seed);
        let ticker = IntervalTicker::new(ctx.link().callback(|_| Msg::Tick));
        Session::new(
            GameConfig::CLASSIC,
            RandomMinefieldGenerator::new(seed),
            ticker,
        )
    }

    fn apply_cells(&mut self, cells: &[CellUpdate]) {
        for &CellUpdate { coords, view } in cells {
            self.frame.cells[coords.to_nd_index()] = view;
        }
    }

    fn open_tile(&mut self, coords: Coord2) {
        let ActionUpdate {
            cells,
            mines_left,
            signal,
        } = self.session.on_primary_action(coords);
        self.apply_cells(&cells);
        self.frame.mines_left = mines_left;
        if let Some(signal) = signal {
            log::debug!("game over: {:?}", signal);
            self.frame.face = match signal {
                GameSignal::Victory => Face::Cool,
                GameSignal::Defeat => Face::Dead,
            };
        }
    }

    fn flag_tile(&mut self, coords: Coord2) {
        let update = self.session.on_secondary_action(coords);
        self.frame.mines_left = update.mines_left;
        if let Some(cell) = update.cell {
            self.apply_cells(&[cell]);
        }
    }

    fn is_pressed(&self, coords: Coord2, view: CellView) -> bool {
        if self.session.phase().is_finished() || view != CellView::Hidden {
            return false;
        }
        match self.cur_tile_state {
            Some(TileState {
                pos,
                buttons: MouseButtons::LEFT,
            }) if pos == coords => true,
            Some(TileState {
                pos,
                buttons: MouseButtons::LEFT,
            }) if is_within_one(pos, coords) => self.session.is_chordable(pos),
            _ => false,
        }
    }

    fn face_class(&self) -> Classes {
        let mid_open = matches!(
            self.cur_tile_state,
            Some(TileState {
                buttons: MouseButtons::LEFT,
                ..
            })
        );
        classes!(match self.frame.face {
            Face::Smile if mid_open => "mid-open",
            Face::Smile => "in-progress",
            Face::Cool => "won",
            Face::Dead => "lost",
        })
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        let seed = ctx.props().seed.unwrap_or_else(js_random_seed);
        let session = GameView::create_session(ctx, seed);
        let frame = session.frame();
        Self {
            session,
            frame,
            cur_tile_state: None,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;
        use TileMsg::*;

        match msg {
            TileEvent(Leave) => {
                log::trace!("tile leave");
                self.cur_tile_state.take().is_some()
            }
            TileEvent(Update(tile_state)) => {
                log::trace!("tile update: {:?}", tile_state);
                if tile_state.buttons.is_empty() {
                    // all mouse buttons were released while in tile_state.pos
                    match self.cur_tile_state.take() {
                        None => false,
                        Some(TileState { pos, buttons }) => match buttons {
                            MouseButtons::LEFT => {
                                log::debug!("open tile: {:?}", pos);
                                self.open_tile(pos);
                                true
                            }
                            MouseButtons::RIGHT => {
                                log::debug!("flag tile: {:?}", pos);
                                self.flag_tile(pos);
                                true
                            }
                            // several buttons released at once cancels, redraw to unpress tiles
                            _ => true,
                        },
                    }
                } else {
                    match self.cur_tile_state.replace(tile_state) {
                        None => true,
                        Some(TileState { pos, buttons }) => {
                            (pos != tile_state.pos)
                                || ((buttons & MouseButtons::LEFT)
                                    != (tile_state.buttons & MouseButtons::LEFT))
                        }
                    }
                }
            }
            Tick => {
                let elapsed_secs = self.session.on_tick();
                if self.frame.elapsed_secs != elapsed_secs {
                    self.frame.elapsed_secs = elapsed_secs;
                    true
                } else {
                    false
                }
            }
            NewGame => {
                self.frame = self.session.on_reset();
                self.cur_tile_state = None;
                true
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let (rows, cols) = self.frame.size();
        let face_class = self.face_class();
        let face = face_glyph(self.frame.face);
        let mines_left = format_counter(self.frame.mines_left);
        let elapsed_time = format_counter(self.frame.elapsed_secs as isize);
        let cb_new_game = ctx.link().callback(|e: MouseEvent| {
            e.stop_propagation();
            Msg::NewGame
        });

        html! {
            <div class="sweeper" oncontextmenu={Callback::from(move |e: MouseEvent| e.prevent_default())}>
                <nav>
                    <aside>{mines_left}</aside>
                    <span><button class={face_class} onclick={cb_new_game}>{face}</button></span>
                    <aside>{elapsed_time}</aside>
                </nav>
                <table>
                    {
                        for (0..rows).map(|row| html! {
                            <tr>
                                {
                                    for (0..cols).map(|col| {
                                        let pos = (row, col);
                                        let view = self.frame.cell_at(pos);
                                        let pressed = self.is_pressed(pos, view);
                                        let callback = ctx.link().callback(Msg::TileEvent);
                                        html! {
                                            <Tile {pos} {view} {callback} {pressed}/>
                                        }
                                    })
                                }
                            </tr>
                        })
                    }
                </table>
            </div>
        }
    }
}
