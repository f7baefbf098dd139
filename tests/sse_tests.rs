use futures::stream::{self, StreamExt};
use video_companion::chat::sse::{SseDecoder, SseEvent};
use video_companion::chat::{decode_pieces, ChatError};

fn delta(text: &str) -> String {
    format!(
        "data: {{\"choices\":[{{\"delta\":{{\"content\":\"{}\"}}}}]}}\n\n",
        text
    )
}

#[test]
fn test_decodes_deltas_in_order() {
    let mut decoder = SseDecoder::new();
    let payload = format!("{}{}data: [DONE]\n\n", delta("Hello"), delta(" world"));

    let events = decoder.push(payload.as_bytes());

    assert_eq!(
        events,
        vec![
            SseEvent::Delta("Hello".to_string()),
            SseEvent::Delta(" world".to_string()),
            SseEvent::Done,
        ]
    );
}

#[test]
fn test_lines_split_across_chunks() {
    let mut decoder = SseDecoder::new();
    let payload = delta("split");
    let (head, tail) = payload.split_at(17);

    assert!(decoder.push(head.as_bytes()).is_empty());
    let events = decoder.push(tail.as_bytes());

    assert_eq!(events, vec![SseEvent::Delta("split".to_string())]);
}

#[test]
fn test_comments_and_other_fields_ignored() {
    let mut decoder = SseDecoder::new();

    let events = decoder
        .push(b": keep-alive\nevent: message\nid: 3\ndata: not json\n\n");

    assert!(events.is_empty());
}

#[test]
fn test_role_only_delta_is_empty() {
    let mut decoder = SseDecoder::new();

    let events = decoder
        .push(b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n");

    assert_eq!(events, vec![SseEvent::Delta(String::new())]);
}

#[test]
fn test_error_payload_fails() {
    let mut decoder = SseDecoder::new();

    let events = decoder.push(b"data: {\"error\":{\"message\":\"quota exceeded\"}}\n");

    assert!(events.is_empty());
    let err = decoder.take_error().expect("error payload");
    assert!(matches!(err, ChatError::Stream(ref m) if m == "quota exceeded"));
    assert!(decoder.take_error().is_none());
}

#[test]
fn test_deltas_before_error_line_kept() {
    let mut decoder = SseDecoder::new();
    let payload = format!(
        "{}data: {{\"error\":{{\"message\":\"quota\"}}}}\n{}",
        delta("Hello"),
        delta("after")
    );

    let events = decoder.push(payload.as_bytes());

    assert_eq!(events, vec![SseEvent::Delta("Hello".to_string())]);
    assert!(matches!(decoder.take_error(), Some(ChatError::Stream(ref m)) if m == "quota"));
}

#[tokio::test]
async fn test_piece_and_failure_in_one_network_chunk() {
    let body = "data: {\"choices\":[{\"delta\":{\"content\":\"Hello\"}}]}\n\
                data: {\"error\":{\"message\":\"quota\"}}\n";
    let chunks = stream::iter(vec![Ok::<_, String>(body.as_bytes().to_vec())]).boxed();

    let pieces: Vec<Result<String, ChatError>> = decode_pieces(chunks).collect().await;

    assert_eq!(pieces.len(), 2);
    assert_eq!(pieces[0].as_deref().ok(), Some("Hello"));
    assert!(matches!(&pieces[1], Err(ChatError::Stream(m)) if m == "quota"));
}

#[tokio::test]
async fn test_pieces_until_done() {
    let body = format!("{}{}data: [DONE]\n\n{}", delta("a"), delta("b"), delta("ignored"));
    let chunks = stream::iter(vec![Ok::<_, String>(body.into_bytes())]).boxed();

    let pieces: Vec<String> = decode_pieces(chunks)
        .map(|p| p.expect("piece"))
        .collect()
        .await;

    assert_eq!(pieces, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_finish_flushes_unterminated_line() {
    let mut decoder = SseDecoder::new();

    assert!(decoder.push(b"data: [DONE]").is_empty());
    assert_eq!(decoder.finish(), Some(SseEvent::Done));
    assert_eq!(decoder.finish(), None);
}
