use anyhow::Result;
use bike_dashboard::{ChartScope, DashboardView, Dataset, HourPoint, Report, Selection};
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Axis, Bar, BarChart, BarGroup, Block, Borders, Chart, Dataset as ChartSeries, GraphType,
        Paragraph, Wrap,
    },
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Weather,
    Holiday,
    Hourly,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Weather => Page::Holiday,
            Page::Holiday => Page::Hourly,
            Page::Hourly => Page::Weather,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Weather => Page::Hourly,
            Page::Holiday => Page::Weather,
            Page::Hourly => Page::Holiday,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Weather => "Weather",
            Page::Holiday => "Holiday vs Working Day",
            Page::Hourly => "Hourly",
        }
    }
}

pub struct App {
    pub dataset: Dataset,
    pub years: Vec<i32>,
    pub span: Option<(NaiveDate, NaiveDate)>,
    pub scope: ChartScope,
    pub initial: Selection,
    pub selection: Selection,
    pub view: DashboardView,
    pub current_page: Page,
}

impl App {
    pub fn new(dataset: Dataset, selection: Selection, scope: ChartScope) -> Self {
        let years = dataset.years();
        let span = dataset.date_span();
        let view = DashboardView::build(&dataset, &selection, scope);

        Self {
            dataset,
            years,
            span,
            scope,
            initial: selection,
            selection,
            view,
            current_page: Page::Weather,
        }
    }

    /// Recompute the whole view from scratch for the current selection
    fn refresh(&mut self) {
        self.view = DashboardView::build(&self.dataset, &self.selection, self.scope);
    }

    pub fn next_year(&mut self) {
        self.selection.next_year(&self.years);
        self.refresh();
    }

    pub fn previous_year(&mut self) {
        self.selection.previous_year(&self.years);
        self.refresh();
    }

    pub fn shift_start(&mut self, days: i64) {
        if let Some(span) = self.span {
            self.selection.shift_start(days, span);
            self.refresh();
        }
    }

    pub fn shift_end(&mut self, days: i64) {
        if let Some(span) = self.span {
            self.selection.shift_end(days, span);
            self.refresh();
        }
    }

    pub fn reset(&mut self) {
        self.selection = self.initial;
        self.refresh();
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res?;
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            // Shift+arrow moves a week, plain arrow keys a day
            let step = if key.modifiers.contains(KeyModifiers::SHIFT) { 7 } else { 1 };
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Tab => app.next_page(),
                KeyCode::BackTab => app.previous_page(),
                KeyCode::Char('y') => app.next_year(),
                KeyCode::Char('Y') => app.previous_year(),
                KeyCode::Char('[') => app.shift_start(-1),
                KeyCode::Char(']') => app.shift_start(1),
                KeyCode::Char('{') => app.shift_end(-1),
                KeyCode::Char('}') => app.shift_end(1),
                KeyCode::Left => app.shift_start(-step),
                KeyCode::Right => app.shift_start(step),
                KeyCode::Down => app.shift_end(-step),
                KeyCode::Up => app.shift_end(step),
                KeyCode::Char('r') => app.reset(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with page tabs
            Constraint::Min(0),    // Sidebar + content
            Constraint::Length(3), // Key help
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(30), Constraint::Min(0)])
        .split(chunks[1]);

    render_sidebar(f, body[0], app);

    match &app.view {
        DashboardView::Empty { message, .. } => render_warning(f, body[1], message),
        DashboardView::Report(report) => {
            let content = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(3), Constraint::Min(0)])
                .split(body[1]);

            render_metrics(f, content[0], report);
            match app.current_page {
                Page::Weather => render_weather_chart(f, content[1], report),
                Page::Holiday => render_holiday_chart(f, content[1], report),
                Page::Hourly => render_hourly_chart(f, content[1], report),
            }
        }
    }

    render_status_bar(f, chunks[2]);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Weather, Page::Holiday, Page::Hourly];

    let mut tab_spans = vec![Span::styled(
        "Bike Rental Dashboard  |  ",
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title(), style));
    }

    let header = Paragraph::new(Line::from(tab_spans))
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_sidebar(f: &mut Frame, area: Rect, app: &App) {
    let label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let (min, max) = match app.span {
        Some((min, max)) => (min.to_string(), max.to_string()),
        None => ("-".to_string(), "-".to_string()),
    };
    let scope = match app.scope {
        ChartScope::Selection => "selection",
        ChartScope::All => "all rows",
    };

    let content = vec![
        Line::from(""),
        Line::from(vec![Span::styled(" Year:  ", label), Span::raw(app.selection.year.to_string())]),
        Line::from(vec![Span::styled(" Start: ", label), Span::raw(app.selection.start.to_string())]),
        Line::from(vec![Span::styled(" End:   ", label), Span::raw(app.selection.end.to_string())]),
        Line::from(""),
        Line::from(vec![Span::styled(" Min date: ", label), Span::raw(min)]),
        Line::from(vec![Span::styled(" Max date: ", label), Span::raw(max)]),
        Line::from(""),
        Line::from(vec![Span::styled(" Charts: ", label), Span::raw(scope)]),
    ];

    let sidebar = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Filter "),
    );

    f.render_widget(sidebar, area);
}

fn render_warning(f: &mut Frame, area: Rect, message: &str) {
    let warning = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("  ⚠ {}", message),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
    ])
    .wrap(Wrap { trim: false })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Warning "),
    );

    f.render_widget(warning, area);
}

fn render_metrics(f: &mut Frame, area: Rect, report: &Report) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let metrics = [
        ("Casual Users", report.totals.casual, Color::Cyan),
        ("Registered Users", report.totals.registered, Color::Green),
        ("Total Rentals", report.totals.total, Color::Yellow),
    ];

    for ((title, value, color), column) in metrics.into_iter().zip(columns.iter()) {
        let metric = Paragraph::new(Span::styled(
            value.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        );
        f.render_widget(metric, *column);
    }
}

fn render_weather_chart(f: &mut Frame, area: Rect, report: &Report) {
    let mut chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Usage by Weather  [casual: cyan | registered: green | total: yellow] "),
        )
        .bar_width(7)
        .bar_gap(1)
        .group_gap(4);

    for row in &report.weather {
        let bars = [
            Bar::default().value(row.usage.casual).style(Style::default().fg(Color::Cyan)),
            Bar::default().value(row.usage.registered).style(Style::default().fg(Color::Green)),
            Bar::default().value(row.usage.total).style(Style::default().fg(Color::Yellow)),
        ];
        chart = chart.data(
            BarGroup::default()
                .label(Line::from(row.label.clone()))
                .bars(&bars),
        );
    }

    f.render_widget(chart, area);
}

fn render_holiday_chart(f: &mut Frame, area: Rect, report: &Report) {
    let bars: Vec<Bar> = report
        .holiday
        .iter()
        .map(|row| {
            let color = if row.holiday { Color::LightRed } else { Color::Blue };
            Bar::default()
                .label(Line::from(row.label.clone()))
                .value(row.usage.total)
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Holiday vs Working Day - Total Rentals "),
        )
        .bar_width(12)
        .bar_gap(4)
        .data(BarGroup::default().bars(&bars));

    f.render_widget(chart, area);
}

fn to_points(series: &[HourPoint]) -> Vec<(f64, f64)> {
    series
        .iter()
        .map(|p| (f64::from(p.hour), p.total as f64))
        .collect()
}

fn render_hourly_chart(f: &mut Frame, area: Rect, report: &Report) {
    let working = to_points(&report.hourly.working);
    let weekend = to_points(&report.hourly.weekend);
    let y_max = working
        .iter()
        .chain(weekend.iter())
        .map(|(_, y)| *y)
        .fold(1.0, f64::max);

    let datasets = vec![
        ChartSeries::default()
            .name("Working day")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Blue))
            .data(&working),
        ChartSeries::default()
            .name("Weekend / holiday")
            .marker(Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::LightRed))
            .data(&weekend),
    ];

    let x_labels = ["0", "6", "12", "18", "23"].into_iter().map(Span::raw).collect();
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.0}", y_max / 2.0)),
        Span::raw(format!("{:.0}", y_max)),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Hourly Usage: Working Day vs Weekend "),
        )
        .x_axis(
            Axis::default()
                .title("Hour")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, 23.0])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Rentals")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, y_max])
                .labels(y_labels),
        );

    f.render_widget(chart, area);
}

fn render_status_bar(f: &mut Frame, area: Rect) {
    let key = Style::default().fg(Color::Yellow);
    let status_spans = vec![
        Span::styled(" y/Y", key),
        Span::raw(" Year | "),
        Span::styled("[ ]", key),
        Span::raw(" Start | "),
        Span::styled("{ }", key),
        Span::raw(" End | "),
        Span::styled("←/→ ↓/↑", key),
        Span::raw(" Range | "),
        Span::styled("r", key),
        Span::raw(" Reset | "),
        Span::styled("Tab", key),
        Span::raw(" Chart | "),
        Span::styled("q", Style::default().fg(Color::Red)),
        Span::raw(" Quit"),
    ];

    let status_bar = Paragraph::new(Line::from(status_spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}
