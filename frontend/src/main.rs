mod components;

use common::req::Device;
use streetgard_frontend::{config, request, utils};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::toast::ToastProvider;

#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/controller")]
    Controller,
    #[at("/add-streetguard")]
    AddStreetGuard,
    #[not_found]
    #[at("/404")]
    NotFound,
}

#[derive(Properties, PartialEq)]
pub struct Props {
    pub current_route: Route,
}

struct Model {}

impl Component for Model {
    type Message = ();
    type Properties = ();

    fn create(_ctx: &Context<Self>) -> Self {
        Self {}
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <ToastProvider>
                <BrowserRouter>
                    <Switch<Route> render={switch} />
                </BrowserRouter>
            </ToastProvider>
        }
    }
}

#[function_component(PageHome)]
pub fn page_home() -> Html {
    html! {
        <div class="container-fluid">
            <div class="row">
                <Sidebar current_route={Route::Home}/>
                <div class="col-sm-9 col-sm-offset-3 col-md-10 col-md-offset-2 main">
                    <h1 class="page-header">{"All Street Guard"}</h1>
                    <components::map::MapDisplay />
                </div>
            </div>
        </div>
    }
}

#[function_component(PageController)]
pub fn page_controller() -> Html {
    html! {
        <div class="container-fluid">
            <div class="row">
                <Sidebar current_route={Route::Controller}/>
                <div class="col-sm-9 col-sm-offset-3 col-md-10 col-md-offset-2 main">
                    <div class="page-header page-header-actions">
                        <h1>{"List of Street Guard"}</h1>
                        <Link<Route> to={Route::AddStreetGuard} classes="btn btn-primary">
                            {"＋ Add Street Guard"}
                        </Link<Route>>
                    </div>
                    <components::fleet::StreetGardList />
                </div>
            </div>
        </div>
    }
}

#[function_component(PageAddStreetGuard)]
pub fn page_add_street_guard() -> Html {
    let navigator = use_navigator();
    let on_success = Callback::from(move |device: Device| {
        log::info!("street guard {} added", device.id);
        if let Some(navigator) = &navigator {
            navigator.push(&Route::Controller);
        }
    });

    html! {
        <div class="container-fluid">
            <div class="row">
                <Sidebar current_route={Route::AddStreetGuard}/>
                <div class="col-sm-9 col-sm-offset-3 col-md-10 col-md-offset-2 main">
                    <div class="page-header page-header-actions">
                        <h1>{"Add new Street Guard"}</h1>
                        <Link<Route> to={Route::Controller} classes="btn btn-default">
                            {"← Back"}
                        </Link<Route>>
                    </div>
                    <div class="box-center">
                        <components::create_device::CreateDevice {on_success} />
                    </div>
                </div>
            </div>
        </div>
    }
}

#[function_component(Sidebar)]
pub fn sidebar(props: &Props) -> Html {
    let cr = &props.current_route;
    let class_active = move |r| {
        if *cr == r {
            "active"
        } else {
            ""
        }
    };

    html! {
        <div class="col-sm-3 col-md-2 sidebar">
            <ul class="nav nav-sidebar">
                <h3 class="site-name">{config::SITE_NAME}</h3>
                <li class={class_active(Route::Home)}>
                    <Link<Route> to={Route::Home}>{"⌂ Map"}</Link<Route>>
                </li>
                <li class={class_active(Route::Controller)}>
                    <Link<Route> to={Route::Controller}>{"💡 Street Guards"}</Link<Route>>
                </li>
                <li class={class_active(Route::AddStreetGuard)}>
                    <Link<Route> to={Route::AddStreetGuard}>{"＋ Add Street Guard"}</Link<Route>>
                </li>
            </ul>

            <ul class="nav nav-sidebar fix-bottom">
            {format!("v{}.{}.{}", env!("CARGO_PKG_VERSION_MAJOR"), env!("CARGO_PKG_VERSION_MINOR"), env!("CARGO_PKG_VERSION_PATCH"))}
            </ul>

        </div>
    }
}

fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => html! { <PageHome/> },
        Route::Controller => html! { <PageController/> },
        Route::AddStreetGuard => html! { <PageAddStreetGuard/> },
        Route::NotFound => html! { <h1>{ "404 Not Found" }</h1> },
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::new(config::log_level()));
    log::info!("{} dashboard, backend at {}", config::SITE_NAME, config::backend_url());
    yew::Renderer::<Model>::new().render();
}
