//! Kernel helper function ids.
//!
//! Ids follow `enum bpf_func_id` in the kernel UAPI headers. Only the names
//! are used here, for rendering `BPF_CALL_FUNC(...)` lines; the numeric id is
//! what ends up in the instruction word.

use crate::{String, ToString, format};

pub const MAP_LOOKUP_ELEM: i32 = 1;
pub const MAP_UPDATE_ELEM: i32 = 2;
pub const MAP_DELETE_ELEM: i32 = 3;
pub const PROBE_READ: i32 = 4;
pub const KTIME_GET_NS: i32 = 5;
pub const TRACE_PRINTK: i32 = 6;
pub const GET_PRANDOM_U32: i32 = 7;
pub const GET_SMP_PROCESSOR_ID: i32 = 8;
pub const SKB_STORE_BYTES: i32 = 9;
pub const TAIL_CALL: i32 = 12;
pub const GET_CURRENT_PID_TGID: i32 = 14;
pub const GET_CURRENT_UID_GID: i32 = 15;
pub const GET_CURRENT_COMM: i32 = 16;
pub const PERF_EVENT_OUTPUT: i32 = 25;
pub const SKB_LOAD_BYTES: i32 = 26;
pub const RINGBUF_OUTPUT: i32 = 130;
pub const SKB_LOAD_BYTES_RELATIVE: i32 = 68;

const HELPER_NAMES: &[(i32, &str)] = &[
    (0, "unspec"),
    (MAP_LOOKUP_ELEM, "map_lookup_elem"),
    (MAP_UPDATE_ELEM, "map_update_elem"),
    (MAP_DELETE_ELEM, "map_delete_elem"),
    (PROBE_READ, "probe_read"),
    (KTIME_GET_NS, "ktime_get_ns"),
    (TRACE_PRINTK, "trace_printk"),
    (GET_PRANDOM_U32, "get_prandom_u32"),
    (GET_SMP_PROCESSOR_ID, "get_smp_processor_id"),
    (SKB_STORE_BYTES, "skb_store_bytes"),
    (10, "l3_csum_replace"),
    (11, "l4_csum_replace"),
    (TAIL_CALL, "tail_call"),
    (13, "clone_redirect"),
    (GET_CURRENT_PID_TGID, "get_current_pid_tgid"),
    (GET_CURRENT_UID_GID, "get_current_uid_gid"),
    (GET_CURRENT_COMM, "get_current_comm"),
    (17, "get_cgroup_classid"),
    (18, "skb_vlan_push"),
    (19, "skb_vlan_pop"),
    (20, "skb_get_tunnel_key"),
    (21, "skb_set_tunnel_key"),
    (22, "perf_event_read"),
    (23, "redirect"),
    (24, "get_route_realm"),
    (PERF_EVENT_OUTPUT, "perf_event_output"),
    (SKB_LOAD_BYTES, "skb_load_bytes"),
    (SKB_LOAD_BYTES_RELATIVE, "skb_load_bytes_relative"),
    (RINGBUF_OUTPUT, "ringbuf_output"),
];

/// Kernel enum name for a helper id, e.g. `BPF_FUNC_map_lookup_elem`.
///
/// Unknown ids render as their decimal value so the listing stays valid C.
pub fn helper_name(id: i32) -> String {
    match HELPER_NAMES.iter().find(|(helper, _)| *helper == id) {
        Some((_, name)) => format!("BPF_FUNC_{}", name),
        None => id.to_string(),
    }
}
