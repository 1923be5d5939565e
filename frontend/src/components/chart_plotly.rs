use std::rc::Rc;

use common::chart::{self, ChartKind, ChartRow, PanelSpec};
use plotly::{
    common::{Fill, Line, LineShape, Marker, Mode},
    layout::{BarMode, HoverMode, Margin},
    Bar, Configuration, Layout, Plot, Scatter,
};
use yew::prelude::*;

/// Hex alpha suffix of filled areas.
const AREA_ALPHA: &str = "4d";

#[derive(Properties, PartialEq)]
pub struct Props {
    pub panel: &'static PanelSpec,
    pub rows: Rc<Vec<ChartRow>>,
}

fn build_plot(panel: &PanelSpec, rows: &[ChartRow]) -> Plot {
    let mut plot = Plot::new();
    let labels = chart::labels(rows);

    for series in panel.series {
        let values = chart::column(rows, series.field);
        match panel.kind {
            ChartKind::Line => plot.add_trace(
                Scatter::new(labels.clone(), values)
                    .name(series.name)
                    .mode(Mode::Lines)
                    .line(Line::new().color(series.color).shape(LineShape::Spline)),
            ),
            ChartKind::Area => plot.add_trace(
                Scatter::new(labels.clone(), values)
                    .name(series.name)
                    .mode(Mode::Lines)
                    .line(Line::new().color(series.color).shape(LineShape::Spline))
                    .fill(Fill::ToZeroY)
                    .fill_color(format!("{}{AREA_ALPHA}", series.color)),
            ),
            ChartKind::Bar => plot.add_trace(
                Bar::new(labels.clone(), values)
                    .name(series.name)
                    .marker(Marker::new().color(series.color)),
            ),
        }
    }

    plot.set_configuration(
        Configuration::default()
            .display_logo(false)
            .editable(false)
            .display_mode_bar(plotly::configuration::DisplayModeBar::Hover),
    );

    let mut layout = Layout::default()
        .hover_mode(HoverMode::XUnified)
        .auto_size(true)
        .margin(Margin::default().top(20).bottom(40).left(40).right(20));
    if panel.kind == ChartKind::Bar {
        layout = layout.bar_mode(BarMode::Group);
    }
    plot.set_layout(layout);
    plot
}

#[function_component(ChartPlotly)]
pub fn chart_plotly(props: &Props) -> Html {
    let id = props.panel.id;
    let p = yew_hooks::use_async::<_, _, ()>({
        let plot = build_plot(props.panel, &props.rows);
        async move {
            plotly::bindings::new_plot(id, &plot).await;
            Ok(())
        }
    });

    use_effect_with(
        // replot whenever these change
        (id, props.rows.clone()),
        move |_| {
            p.run();
            || ()
        },
    );

    html! {
        <div class="chart-panel">
            <h4>{props.panel.title}</h4>
            <p class="chart-description">{props.panel.description}</p>
            <div class="chart" id={id}></div>
        </div>
    }
}
