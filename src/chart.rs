use charming::{
    component::{
        Axis, Brush, BrushType, DataZoom, DataZoomType, Feature, Grid, Legend, Toolbox,
        ToolboxDataZoom,
    },
    datatype::NumericValue,
    element::{
        AxisLine, AxisPointer, AxisPointerLink, AxisPointerType, AxisType, SplitArea, SplitLine,
        Tooltip, Trigger,
    },
    series::{Candlestick, Scatter},
    Chart,
};
use itertools::Itertools;

use crate::model::backtest_result::BacktestResult;
use crate::model::bar::Bar;
use crate::model::order::{OrderSide, OrderStatus};
use crate::to_utc_time;

/// `[bar index, fill price]` points for every fill on `side`.
fn fill_points(bars: &[Bar], result: &BacktestResult, side: OrderSide) -> Vec<Vec<NumericValue>> {
    result
        .fills
        .iter()
        .filter(|f| f.order.side == side)
        .filter_map(|f| match f.status {
            OrderStatus::Completed { price } => bars
                .binary_search_by_key(&f.timestamp, |b| b.timestamp)
                .ok()
                .map(|idx| vec![NumericValue::Float(idx as f64), price.into()]),
            _ => None,
        })
        .collect_vec()
}

pub fn chart(title: &str, bars: &[Bar], result: &BacktestResult) -> Chart {
    let category_data = bars
        .iter()
        .map(|x| {
            to_utc_time(x.timestamp)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| x.timestamp.to_string())
        })
        .collect_vec();
    let data = bars
        .iter()
        .map(|v| vec![v.open, v.close, v.low, v.high])
        .collect_vec();

    let buys = fill_points(bars, result, OrderSide::Buy);
    let sells = fill_points(bars, result, OrderSide::Sell);

    Chart::new()
        .legend(
            Legend::new()
                .bottom(10)
                .left("center")
                .data(vec![title, "BUY", "SELL"]),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Cross)),
        )
        .axis_pointer(AxisPointer::new().link(vec![AxisPointerLink::new().x_axis_index("all")]))
        .toolbox(
            Toolbox::new().feature(
                Feature::new()
                    .data_zoom(ToolboxDataZoom::new().y_axis_index("none"))
                    .brush(Brush::new().type_(vec![BrushType::LineX, BrushType::Clear])),
            ),
        )
        .grid(Grid::new().left("10%").right("8%").bottom(150))
        .x_axis(
            Axis::new()
                .type_(AxisType::Category)
                .data(category_data)
                .boundary_gap(false)
                .axis_line(AxisLine::new().on_zero(false))
                .split_line(SplitLine::new().show(false))
                .min("dataMin")
                .max("dataMax")
                .axis_pointer(AxisPointer::new().z(100)),
        )
        .y_axis(
            Axis::new()
                .scale(true)
                .split_area(SplitArea::new().show(true)),
        )
        .data_zoom(
            DataZoom::new()
                .type_(DataZoomType::Inside)
                .start(98)
                .end(100)
                .min_value_span(10),
        )
        .data_zoom(
            DataZoom::new()
                .type_(DataZoomType::Slider)
                .bottom(60)
                .start(98)
                .end(100)
                .min_value_span(10),
        )
        .series(Candlestick::new().name(title).data(data))
        .series(Scatter::new().name("BUY").symbol_size(12.0).data(buys))
        .series(Scatter::new().name("SELL").symbol_size(12.0).data(sells))
}
