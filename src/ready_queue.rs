//! Rebuilds the ready queue at an arbitrary instant from a finished trace.
//!
//! Only the Gantt segments are available, so each process's burst,
//! remaining time and arrival are re-derived from its segments and the
//! queue is ordered with the same keys and tie-breaks the engines use. The
//! running process (if any) is listed first wherever the policy would not
//! naturally sort it there.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::{
    Policy,
    core::{Priority, Ticks, arrival_order},
    scheduler::priority::DEFAULT_PRIORITY,
    sim::Segment,
};

#[derive(Debug)]
struct ProcessTrace<'a> {
    process_id: &'a str,
    arrival_time: Ticks,
    priority: Priority,
    burst: Ticks,
    executed: Ticks,
    first_start: Ticks,
    // Latest segment end at or before the query instant
    last_end: Option<Ticks>,
}

impl ProcessTrace<'_> {
    fn remaining(&self) -> Ticks {
        self.burst - self.executed
    }

    fn arrival_cmp(&self, other: &Self) -> Ordering {
        arrival_order(
            self.arrival_time,
            self.process_id,
            other.arrival_time,
            other.process_id,
        )
    }
}

fn collect_traces(gantt: &[Segment], t: Ticks) -> Vec<ProcessTrace<'_>> {
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut traces: Vec<ProcessTrace<'_>> = Vec::new();

    for segment in gantt {
        let slot = *index.entry(segment.process_id.as_str()).or_insert_with(|| {
            traces.push(ProcessTrace {
                process_id: &segment.process_id,
                arrival_time: segment.arrival_time,
                priority: segment.priority.unwrap_or(DEFAULT_PRIORITY),
                burst: 0,
                executed: 0,
                first_start: segment.start_time,
                last_end: None,
            });
            traces.len() - 1
        });

        let trace = &mut traces[slot];
        let duration = segment.duration();
        trace.burst += duration;
        trace.first_start = trace.first_start.min(segment.start_time);
        if segment.start_time <= t {
            trace.executed += duration.min(t - segment.start_time);
        }
        if segment.end_time <= t {
            let end = trace.last_end.map_or(segment.end_time, |e| e.max(segment.end_time));
            trace.last_end = Some(end);
        }
    }

    traces
}

fn pin_first<'a>(mut queue: Vec<&'a str>, running: Option<&str>) -> Vec<&'a str> {
    if let Some(pos) = running.and_then(|r| queue.iter().position(|&p| p == r)) {
        let running = queue.remove(pos);
        queue.insert(0, running);
    }
    queue
}

/// Ordered process ids in the ready queue at instant `t` under `policy`.
///
/// An empty or malformed trace (a segment that does not end after it
/// starts) yields an empty queue.
pub fn ready_queue_at(gantt: &[Segment], t: Ticks, policy: Policy) -> Vec<String> {
    if gantt.is_empty() || gantt.iter().any(|s| s.end_time <= s.start_time) {
        return Vec::new();
    }

    let traces = collect_traces(gantt, t);
    let running = gantt
        .iter()
        .find(|s| s.start_time <= t && t < s.end_time)
        .map(|s| s.process_id.as_str());

    let mut waiting: Vec<&ProcessTrace<'_>> = traces
        .iter()
        .filter(|p| p.arrival_time <= t && p.remaining() > 0)
        .collect();

    let queue = if policy == Policy::RoundRobin {
        round_robin_order(&waiting, t, running)
    } else {
        waiting.sort_by(|a, b| key_order(policy, a, b).then_with(|| a.arrival_cmp(b)));
        // Without preemption the running process holds the head whatever its key
        if policy.is_preemptive() {
            ids(&waiting)
        } else {
            pin_first(ids(&waiting), running)
        }
    };

    queue.into_iter().map(str::to_owned).collect()
}

fn key_order(policy: Policy, a: &ProcessTrace<'_>, b: &ProcessTrace<'_>) -> Ordering {
    match policy {
        Policy::Sjf => a.burst.cmp(&b.burst),
        Policy::Srtf => a.remaining().cmp(&b.remaining()),
        Policy::Priority | Policy::PriorityPreemptive => a.priority.cmp(&b.priority),
        Policy::Fcfs | Policy::RoundRobin => Ordering::Equal,
    }
}

fn ids<'a>(traces: &[&ProcessTrace<'a>]) -> Vec<&'a str> {
    traces.iter().map(|p| p.process_id).collect()
}

// Running first, then arrived-but-never-started by arrival, then previously
// preempted processes by the instant they last left the CPU, oldest first.
fn round_robin_order<'a>(
    waiting: &[&ProcessTrace<'a>],
    t: Ticks,
    running: Option<&'a str>,
) -> Vec<&'a str> {
    let mut not_started: Vec<&ProcessTrace<'a>> = waiting
        .iter()
        .copied()
        .filter(|p| p.first_start > t)
        .collect();
    not_started.sort_by(|a, b| a.arrival_cmp(b));

    let mut preempted: Vec<&ProcessTrace<'a>> = waiting
        .iter()
        .copied()
        .filter(|p| p.first_start <= t && Some(p.process_id) != running)
        .collect();
    preempted.sort_by(|a, b| {
        a.last_end
            .unwrap_or(0)
            .cmp(&b.last_end.unwrap_or(0))
            .then_with(|| a.arrival_cmp(b))
    });

    running
        .into_iter()
        .chain(not_started.into_iter().map(|p| p.process_id))
        .chain(preempted.into_iter().map(|p| p.process_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(id: &str, start: Ticks, end: Ticks, arrival: Ticks) -> Segment {
        Segment {
            process_id: id.to_string(),
            start_time: start,
            end_time: end,
            arrival_time: arrival,
            priority: None,
        }
    }

    #[test]
    fn empty_or_malformed_trace_gives_empty_queue() {
        assert!(ready_queue_at(&[], 0, Policy::Fcfs).is_empty());
        let bad = [seg("A", 0, 2, 0), seg("B", 3, 3, 0)];
        assert!(ready_queue_at(&bad, 1, Policy::Fcfs).is_empty());
    }

    #[test]
    fn srtf_sorts_by_live_remaining_time() {
        // A(8) runs 0-1, B(4) 1-2, C(2) 2-4, B 4-7, A 7-14
        let gantt = [
            seg("A", 0, 1, 0),
            seg("B", 1, 2, 1),
            seg("C", 2, 4, 2),
            seg("B", 4, 7, 1),
            seg("A", 7, 14, 0),
        ];
        assert_eq!(ready_queue_at(&gantt, 3, Policy::Srtf), ["C", "B", "A"]);
        assert_eq!(ready_queue_at(&gantt, 5, Policy::Srtf), ["B", "A"]);
        assert!(ready_queue_at(&gantt, 14, Policy::Srtf).is_empty());
    }

    #[test]
    fn sjf_pins_running_process() {
        let gantt = [seg("long", 0, 6, 0), seg("short", 6, 7, 1)];
        assert_eq!(ready_queue_at(&gantt, 2, Policy::Sjf), ["long", "short"]);
        // before `short` arrives only the running process is queued
        assert_eq!(ready_queue_at(&gantt, 0, Policy::Sjf), ["long"]);
    }

    #[test]
    fn round_robin_puts_newcomers_before_preempted() {
        let gantt = [
            seg("A", 0, 2, 0),
            seg("B", 2, 4, 0),
            seg("A", 4, 6, 0),
            seg("C", 6, 7, 3),
            seg("B", 7, 8, 0),
            seg("A", 8, 9, 0),
        ];
        assert_eq!(ready_queue_at(&gantt, 5, Policy::RoundRobin), ["A", "C", "B"]);
        assert_eq!(ready_queue_at(&gantt, 1, Policy::RoundRobin), ["A", "B"]);
        assert_eq!(ready_queue_at(&gantt, 7, Policy::RoundRobin), ["B", "A"]);
    }

    #[test]
    fn priority_pinning_depends_on_preemption() {
        let mut gantt = [seg("low", 0, 4, 0), seg("high", 4, 6, 1)];
        gantt[0].priority = Some(3);
        gantt[1].priority = Some(1);
        assert_eq!(ready_queue_at(&gantt, 2, Policy::Priority), ["low", "high"]);
        assert_eq!(
            ready_queue_at(&gantt, 2, Policy::PriorityPreemptive),
            ["high", "low"]
        );
    }
}
