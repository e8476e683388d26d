//! Recommendations, friends and friend requests

use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use tandem_api::{
    ApiError,
    requests::PageQuery,
    responses::{
        FriendRequestPage, FriendRequestResponse, FriendRequestsResponse, FriendsResponse,
        MessageResponse, Pagination, RecommendedUsersResponse,
    },
};
use tandem_core::{FriendRequest, FriendRequestId, PageInfo, PageRequest, UserId, UserProfile};
use tracing::info;

use crate::{middleware::CurrentUser, state::AppState};

/// Onboarded users the current user is not yet connected to
pub async fn recommended_users(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<RecommendedUsersResponse>, ApiError> {
    let page = query.to_page_request();
    let (users, total) = state.store.recommended_users(&me, page).await?;

    Ok(Json(RecommendedUsersResponse {
        users: users.iter().map(|u| u.profile()).collect(),
        pagination: Pagination::new(PageInfo::new(page, total)),
    }))
}

/// The current user's friends
pub async fn my_friends(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<FriendsResponse>, ApiError> {
    let page = query.to_page_request();
    let (friends, total) = state.store.friends_page(&me, page).await?;

    Ok(Json(FriendsResponse {
        friends: friends.iter().map(|u| u.profile()).collect(),
        pagination: Pagination::new(PageInfo::new(page, total)),
    }))
}

/// Send a friend request to the user named in the path
pub async fn send_friend_request(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Path(recipient_id): Path<String>,
) -> Result<(StatusCode, Json<FriendRequestResponse>), ApiError> {
    let recipient_id: UserId = recipient_id.parse()?;

    // Compare parsed ids; the same uuid has more than one spelling
    if recipient_id == me.id {
        return Err(ApiError::validation(
            "You can't send friend request to yourself",
        ));
    }

    let recipient = state
        .store
        .get_user(recipient_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Recipient not found"))?;

    if recipient.is_friend_of(me.id) {
        return Err(ApiError::validation(
            "You are already friends with this user",
        ));
    }

    if state
        .store
        .find_request_between(me.id, recipient.id)
        .await?
        .is_some()
    {
        return Err(ApiError::validation(
            "A friend request already exists between you and this user",
        ));
    }

    let request = state
        .store
        .create_friend_request(me.id, recipient.id)
        .await?;

    info!("Friend request {} sent: {} -> {}", request.id, me.id, recipient.id);

    Ok((
        StatusCode::CREATED,
        Json(FriendRequestResponse::from(&request)),
    ))
}

/// Accept a pending request addressed to the current user
pub async fn accept_friend_request(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Path(request_id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let request_id: FriendRequestId = request_id.parse()?;

    let request = state
        .store
        .get_friend_request(request_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Friend request not found"))?;

    if request.recipient != me.id {
        return Err(ApiError::forbidden(
            "You are not authorized to accept this request",
        ));
    }

    state.store.accept_friend_request(&request).await?;

    Ok(Json(MessageResponse::new("Friend request accepted")))
}

/// Incoming pending requests and the user's own accepted requests, paged
/// independently with the same page/limit
pub async fn friend_requests(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<FriendRequestsResponse>, ApiError> {
    let page = query.to_page_request();

    let (incoming, accepted) = tokio::try_join!(
        state.store.incoming_requests(me.id, page),
        state.store.accepted_requests(me.id, page),
    )?;

    Ok(Json(FriendRequestsResponse {
        incoming_reqs: request_page(incoming, page, FriendRequestResponse::with_sender),
        accepted_reqs: request_page(accepted, page, FriendRequestResponse::with_recipient),
    }))
}

/// Pending requests the current user has sent
pub async fn outgoing_friend_requests(
    State(state): State<AppState>,
    Extension(CurrentUser(me)): Extension<CurrentUser>,
    Query(query): Query<PageQuery>,
) -> Result<Json<FriendRequestPage>, ApiError> {
    let page = query.to_page_request();
    let outgoing = state.store.outgoing_requests(me.id, page).await?;

    Ok(Json(request_page(
        outgoing,
        page,
        FriendRequestResponse::with_recipient,
    )))
}

fn request_page(
    (rows, total): (Vec<(FriendRequest, UserProfile)>, u64),
    page: PageRequest,
    populate: fn(&FriendRequest, UserProfile) -> FriendRequestResponse,
) -> FriendRequestPage {
    FriendRequestPage {
        requests: rows
            .into_iter()
            .map(|(request, peer)| populate(&request, peer))
            .collect(),
        pagination: Pagination::new(PageInfo::new(page, total)),
    }
}
