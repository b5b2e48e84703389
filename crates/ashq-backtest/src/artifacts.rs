use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ashq_portfolio::PortfolioSummary;
use ashq_schemas::Trade;

use crate::result::BacktestRunResult;

pub struct ArtifactPaths {
    pub run_dir: PathBuf,
    pub result_json: PathBuf,
    /// `None` when `config.save_trades` is `false`.
    pub trades_csv: Option<PathBuf>,
    /// `None` when `config.save_positions` is `false`.
    pub portfolio_csv: Option<PathBuf>,
    /// `None` when `config.save_performance` is `false`.
    pub report_md: Option<PathBuf>,
}

/// Writes every persisted artifact for one completed run under
/// `output_dir/<strategy_name>/<run_timestamp>/`, via plain
/// `std::fs::write` plus `serde_json::to_string_pretty` — no
/// templating engine. `run_timestamp` is supplied by the caller rather
/// than read from the wall clock, so this module stays reproducible
/// given the same inputs. The result JSON is always written; the
/// trades/portfolio/report files are gated by
/// `result.config.save_trades/save_positions/save_performance`.
pub fn write_run_artifacts(
    output_dir: &Path,
    run_timestamp: &str,
    result: &BacktestRunResult,
    trades: &[Trade],
) -> Result<ArtifactPaths> {
    let run_dir = output_dir.join(&result.strategy_info.name).join(run_timestamp);
    fs::create_dir_all(&run_dir)
        .with_context(|| format!("create run artifacts dir failed: {}", run_dir.display()))?;

    let result_json = run_dir.join(format!("{}_backtest_result.json", result.strategy_info.name));
    let json = serde_json::to_string_pretty(result).context("serialize backtest result failed")?;
    fs::write(&result_json, format!("{json}\n"))
        .with_context(|| format!("write backtest result failed: {}", result_json.display()))?;

    let trades_csv = if result.config.save_trades {
        let path = run_dir.join(format!("{}_trades.csv", result.strategy_info.name));
        fs::write(&path, render_trades_csv(trades))
            .with_context(|| format!("write trades csv failed: {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    let portfolio_csv = if result.config.save_positions {
        let path = run_dir.join(format!("{}_portfolio.csv", result.strategy_info.name));
        fs::write(&path, render_portfolio_csv(&result.portfolio_summary))
            .with_context(|| format!("write portfolio csv failed: {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    let report_md = if result.config.save_performance {
        let path = run_dir.join(format!("{}_comprehensive_analysis_report.md", result.strategy_info.name));
        fs::write(&path, render_report_markdown(result))
            .with_context(|| format!("write analysis report failed: {}", path.display()))?;
        Some(path)
    } else {
        None
    };

    Ok(ArtifactPaths { run_dir, result_json, trades_csv, portfolio_csv, report_md })
}

fn render_trades_csv(trades: &[Trade]) -> String {
    let mut csv = String::from("trade_date,symbol,side,qty,price,commission,stamp_tax,transfer_fee,net_cash_delta\n");
    for t in trades {
        csv.push_str(&format!(
            "{},{},{:?},{},{},{},{},{},{}\n",
            t.trade_date, t.symbol, t.side, t.qty, t.price, t.commission, t.stamp_tax, t.transfer_fee, t.net_cash_delta,
        ));
    }
    csv
}

fn render_portfolio_csv(summary: &PortfolioSummary) -> String {
    let mut csv =
        String::from("symbol,qty,avg_cost,market_value,unrealized_pnl,unrealized_pnl_pct,entry_date,last_update\n");
    for position in summary.positions.values() {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{}\n",
            position.symbol,
            position.qty,
            position.avg_cost,
            position.market_value,
            position.unrealized_pnl,
            position.unrealized_pnl_pct,
            position.entry_date,
            position.last_update,
        ));
    }
    csv
}

fn render_report_markdown(result: &BacktestRunResult) -> String {
    let basic = &result.performance.basic;
    let advanced = &result.performance.advanced;
    let trade = &result.performance.trade;
    let portfolio = &result.portfolio_summary;

    format!(
        "# {name} backtest report\n\n\
        ## Summary\n\n\
        - Total return: {total_return:.4}\n\
        - Annualized return: {annual_return:.4}\n\
        - Volatility: {volatility:.4}\n\
        - Sharpe: {sharpe:.4}\n\
        - Max drawdown: {max_drawdown:.4}\n\
        - Calmar: {calmar:.4}\n\n\
        ## Risk\n\n\
        - Sortino: {sortino:.4}\n\
        - VaR (5%): {var_5:.4}\n\
        - CVaR (5%): {cvar_5:.4}\n\
        - Max consecutive losing days: {max_consecutive_losing_days}\n\
        - Winning days ratio: {winning_days_ratio:.4}\n\
        - Avg win/loss ratio: {avg_win_loss_ratio:.4}\n\n\
        ## Trading activity\n\n\
        - Total trades: {total_trades}\n\
        - Buy / sell: {buy_trades} / {sell_trades}\n\
        - Total commission: {total_commission:.2}\n\
        - Total stamp tax: {total_stamp_tax:.2}\n\
        - Average holding period (trading days): {avg_holding_period_days:.2}\n\n\
        ## Final portfolio\n\n\
        - Cash: {cash:.2}\n\
        - Positions value: {positions_value:.2}\n\
        - Total value: {total_value:.2}\n\
        - Open positions: {position_count}\n",
        name = result.strategy_info.name,
        total_return = basic.total_return,
        annual_return = basic.annual_return,
        volatility = basic.volatility,
        sharpe = basic.sharpe,
        max_drawdown = basic.max_drawdown,
        calmar = basic.calmar,
        sortino = advanced.sortino,
        var_5 = advanced.var_5,
        cvar_5 = advanced.cvar_5,
        max_consecutive_losing_days = advanced.max_consecutive_losing_days,
        winning_days_ratio = advanced.winning_days_ratio,
        avg_win_loss_ratio = advanced.avg_win_loss_ratio,
        total_trades = trade.total_trades,
        buy_trades = trade.buy_trades,
        sell_trades = trade.sell_trades,
        total_commission = trade.total_commission,
        total_stamp_tax = trade.total_stamp_tax,
        avg_holding_period_days = trade.avg_holding_period_days,
        cash = portfolio.cash,
        positions_value = portfolio.positions_value,
        total_value = portfolio.total_value,
        position_count = portfolio.position_count,
    )
}
